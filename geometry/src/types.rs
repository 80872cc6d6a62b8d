//! Vertex attribute element types.
//!
//! Each channel stores one of these types. Positions and UVs reuse `glam`
//! vectors; colors are packed RGBA8 so a full stream can be cast to bytes
//! without conversion.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use static_assertions::assert_eq_size;

/// Vertex position. UI geometry keeps `z = 0`.
pub type Position = glam::Vec3;

/// Texture coordinate.
pub type Uv = glam::Vec2;

/// Triangle index into the vertex streams of one builder.
pub type Index = u16;

/// Number of quads a single builder can address with [`Index`].
///
/// Four vertices per quad and 65 536 addressable vertices.
pub const MAX_INDEXABLE_QUADS: usize = (Index::MAX as usize + 1) / 4;

/// A packed 8-bit-per-channel RGBA color.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct Color32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

assert_eq_size!(Color32, u32);

impl Color32 {
    /// Opaque white, the default UI tint.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// White with zero alpha.
    pub const CLEAR_WHITE: Self = Self::new(255, 255, 255, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// All channels zero.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Create a color from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha by `other / 255`, rounding down.
    pub fn attenuate_alpha(self, other: u8) -> Self {
        let a = (self.a as u16 * other as u16) / 255;
        self.with_alpha(a as u8)
    }
}

/// Axis-aligned rectangle in the XY plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Create a rect from its corners.
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest rect containing every point, or `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut rect = Self::new(first, first);
        for p in points {
            rect.min = rect.min.min(p);
            rect.max = rect.max.max(p);
        }
        Some(rect)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}
