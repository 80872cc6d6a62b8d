//! Interfaces between builders and external mesh resources.

use bitflags::bitflags;

use crate::types::{Color32, Index, Position, Uv};

use super::data::BackingMesh;

bitflags! {
    /// Shortcuts a sink may take when a stream is uploaded.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UploadFlags: u32 {
        /// Skip checking that indices address existing vertices.
        const DONT_VALIDATE_INDICES = 1 << 0;
        /// Skip recomputing bounds after the stream changes.
        const DONT_RECALCULATE_BOUNDS = 1 << 1;
    }
}

impl UploadFlags {
    /// Flags used by builder fills: the builder guarantees valid indices and
    /// signals bounds recomputation once at the end.
    pub const FAST: Self = Self::DONT_VALIDATE_INDICES.union(Self::DONT_RECALCULATE_BOUNDS);
}

impl Default for UploadFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// An externally owned mesh resource a builder uploads into.
///
/// A builder only ever fills an empty sink; it never appends.
pub trait MeshSink {
    /// Number of vertices currently held.
    fn vertex_count(&self) -> usize;

    /// Number of indices currently held.
    fn index_count(&self) -> usize;

    /// Replace the position stream.
    fn set_positions(&mut self, data: &[Position], flags: UploadFlags);

    /// Replace the UV stream.
    fn set_uvs(&mut self, data: &[Uv], flags: UploadFlags);

    /// Replace the color stream.
    fn set_colors(&mut self, data: &[Color32], flags: UploadFlags);

    /// Replace the triangle index stream.
    fn set_indices(&mut self, data: &[Index], flags: UploadFlags);

    /// Recompute bounds from the current positions.
    fn recalculate_bounds(&mut self);

    /// Drop all streams.
    fn clear(&mut self);

    /// Check if the sink holds no geometry.
    fn is_empty(&self) -> bool {
        self.vertex_count() == 0 && self.index_count() == 0
    }
}

/// A consumer that takes a finished mesh, e.g. a per-element renderer.
///
/// Implementations copy what they need; the mesh goes back to its pool
/// right after the call.
pub trait MeshTarget {
    /// Take the contents of `mesh`.
    fn set_mesh(&mut self, mesh: &BackingMesh);
}
