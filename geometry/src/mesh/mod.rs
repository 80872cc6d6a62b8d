//! Mesh resources the builders fill.
//!
//! - [`MeshSink`] - what a builder needs from an external mesh resource
//! - [`UploadFlags`] - per-stream upload shortcuts
//! - [`MeshTarget`] - a renderer that takes a finished mesh
//! - [`BackingMesh`] - CPU-side mesh resource implementing both
//! - [`MeshPool`] - free list of backing meshes

mod data;
mod pool;
mod sink;

pub use data::BackingMesh;
pub use pool::MeshPool;
pub use sink::{MeshSink, MeshTarget, UploadFlags};
