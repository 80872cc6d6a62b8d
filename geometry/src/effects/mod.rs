//! Geometry effects that reuse a builder's channels.
//!
//! - [`Duplicator`] - N translated, recolored copies of existing geometry
//! - [`ShadowStyle`] / [`ShadowEffect`] - drop shadow and outline presets

mod shadow;

pub use shadow::{Duplicator, ShadowEffect, ShadowStyle};
