//! CPU-side mesh resource.
//!
//! [`BackingMesh`] is the concrete resource builders fill when no GPU
//! mesh is involved, and the reference [`MeshSink`] implementation. Streams
//! are kept separate so each can be cast to bytes for upload without
//! interleaving.

use crate::types::{Color32, Index, Position, Rect, Uv};

use super::sink::{MeshSink, MeshTarget, UploadFlags};

/// A mesh resource holding four attribute streams and cached bounds.
///
/// Clearing keeps every stream's allocation, so a pooled `BackingMesh`
/// reaches a steady state with no further allocation.
#[derive(Clone, Default)]
pub struct BackingMesh {
    positions: Vec<Position>,
    uvs: Vec<Uv>,
    colors: Vec<Color32>,
    indices: Vec<Index>,
    bounds: Option<Rect>,
    label: Option<String>,
}

impl BackingMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the debug label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the positions.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Get the texture coordinates.
    pub fn uvs(&self) -> &[Uv] {
        &self.uvs
    }

    /// Get the vertex colors.
    pub fn colors(&self) -> &[Color32] {
        &self.colors
    }

    /// Get the triangle indices.
    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    /// Bounds as of the last recalculation.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Raw position bytes for GPU upload.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw UV bytes for GPU upload.
    pub fn uv_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.uvs)
    }

    /// Raw color bytes for GPU upload.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Raw index bytes for GPU upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Replace every stream with a copy of `other`'s, reusing allocations.
    pub fn copy_from(&mut self, other: &BackingMesh) {
        copy_stream(&mut self.positions, &other.positions);
        copy_stream(&mut self.uvs, &other.uvs);
        copy_stream(&mut self.colors, &other.colors);
        copy_stream(&mut self.indices, &other.indices);
        self.bounds = other.bounds;
    }
}

fn copy_stream<T: Copy>(dst: &mut Vec<T>, src: &[T]) {
    dst.clear();
    dst.extend_from_slice(src);
}

impl MeshSink for BackingMesh {
    fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn index_count(&self) -> usize {
        self.indices.len()
    }

    fn set_positions(&mut self, data: &[Position], flags: UploadFlags) {
        copy_stream(&mut self.positions, data);
        if !flags.contains(UploadFlags::DONT_RECALCULATE_BOUNDS) {
            self.recalculate_bounds();
        }
    }

    fn set_uvs(&mut self, data: &[Uv], _flags: UploadFlags) {
        copy_stream(&mut self.uvs, data);
    }

    fn set_colors(&mut self, data: &[Color32], _flags: UploadFlags) {
        copy_stream(&mut self.colors, data);
    }

    fn set_indices(&mut self, data: &[Index], flags: UploadFlags) {
        if !flags.contains(UploadFlags::DONT_VALIDATE_INDICES) {
            let vertex_count = self.positions.len();
            if let Some(bad) = data.iter().find(|&&i| i as usize >= vertex_count) {
                log::error!(
                    "index {bad} out of range for {vertex_count} vertices in mesh {:?}, indices rejected",
                    self.label
                );
                self.indices.clear();
                return;
            }
        }
        copy_stream(&mut self.indices, data);
    }

    fn recalculate_bounds(&mut self) {
        self.bounds = Rect::from_points(self.positions.iter().map(|p| p.truncate()));
    }

    fn clear(&mut self) {
        self.positions.clear();
        self.uvs.clear();
        self.colors.clear();
        self.indices.clear();
        self.bounds = None;
    }
}

impl MeshTarget for BackingMesh {
    fn set_mesh(&mut self, mesh: &BackingMesh) {
        self.copy_from(mesh);
    }
}

impl std::fmt::Debug for BackingMesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackingMesh")
            .field("label", &self.label)
            .field("vertex_count", &self.positions.len())
            .field("index_count", &self.indices.len())
            .field("bounds", &self.bounds)
            .finish()
    }
}
