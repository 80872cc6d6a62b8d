//! Mesh builders.
//!
//! A [`MeshBuilder`] composes the four channels of one mesh generation
//! pass. The usual flow within one rebuild:
//!
//! 1. rent a builder from a [`BuilderPool`]
//! 2. set up each channel (directly, via [`MeshBuilder::set_up_quad`], or a
//!    [`QuadBatch`]) and fill the returned arrays
//! 3. optionally run effects such as [`ShadowEffect`](crate::ShadowEffect)
//! 4. fill an external mesh with [`MeshBuilder::fill_mesh_and_invalidate`]
//!    or [`MeshBuilder::set_mesh_and_invalidate`]
//! 5. drop the [`PooledBuilder`] guard, which returns the builder

mod pool;
mod quad_batch;

pub use pool::{BuilderPool, PooledBuilder};
pub use quad_batch::QuadBatch;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;

use crate::channel::Channel;
use crate::error::{GeometryError, GeometryResult};
use crate::mesh::{MeshPool, MeshSink, MeshTarget, UploadFlags};
use crate::tables::GeometryCaches;
use crate::types::{Color32, Index, Position, Rect, Uv};

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(1);

/// Four channels describing one mesh generation pass.
///
/// All four channels are prepared together or not at all. A pooled builder
/// is always fully invalidated.
pub struct MeshBuilder {
    /// Vertex positions.
    pub positions: Channel<Position>,
    /// Texture coordinates, one per vertex.
    pub uvs: Channel<Uv>,
    /// Vertex colors, one per vertex.
    pub colors: Channel<Color32>,
    /// Triangle indices.
    pub indices: Channel<Index>,
    caches: Arc<GeometryCaches>,
    id: u64,
}

impl MeshBuilder {
    /// Create an invalidated builder sized by the caches' configuration.
    pub fn new(caches: Arc<GeometryCaches>) -> Self {
        let config = *caches.config();
        Self {
            positions: Channel::new(config.initial_vertex_capacity),
            uvs: Channel::new(config.initial_vertex_capacity),
            colors: Channel::new(config.initial_vertex_capacity),
            indices: Channel::new(config.initial_index_capacity),
            caches,
            id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Unique instance id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Caches this builder binds shared data from.
    pub fn caches(&self) -> &Arc<GeometryCaches> {
        &self.caches
    }

    /// Set up a single axis-aligned quad spanning `pos1` to `pos2`.
    ///
    /// Vertex order is bottom-left, bottom-right, top-left, top-right, with
    /// `pos1`/`uv1` at the bottom-left corner.
    pub fn set_up_quad(&mut self, pos1: Vec2, pos2: Vec2, uv1: Vec2, uv2: Vec2, color: Color32) {
        quad_batch::write_rect(self.positions.set_up(4), pos1, pos2, |p| p.extend(0.0));
        quad_batch::write_rect(self.uvs.set_up(4), uv1, uv2, |uv| uv);
        self.set_up_colors(color, 4);
        self.set_up_quad_indices(1);
    }

    /// Start a batch of up to `capacity` quads.
    pub fn quad_batch(&mut self, capacity: usize) -> QuadBatch<'_> {
        QuadBatch::new(self, capacity)
    }

    /// Set up the color channel with `count` copies of `color`.
    ///
    /// Opaque white and clear white bind a shared stream; other colors fill
    /// the backing store.
    pub fn set_up_colors(&mut self, color: Color32, count: usize) {
        match self.caches.solid_colors(color, count) {
            Some(shared) => self.colors.set_up_shared(shared),
            None => self.colors.set_up(count).fill(color),
        }
    }

    /// Bind the shared quad index pattern for `quad_count` quads.
    pub fn set_up_quad_indices(&mut self, quad_count: usize) {
        let indices = self.caches.quad_indices(quad_count);
        self.indices.set_up_shared(indices);
    }

    /// Prepare every channel with zero elements.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.uvs.clear();
        self.colors.clear();
        self.indices.clear();
    }

    /// Alias of [`clear`](Self::clear) for elements with nothing to draw.
    pub fn set_up_empty(&mut self) {
        self.clear();
    }

    /// Shrink to `vertex_count` vertices and `index_count` indices.
    pub fn trim_after(&mut self, vertex_count: usize, index_count: usize) {
        self.positions.trim_end(vertex_count);
        self.uvs.trim_end(vertex_count);
        self.colors.trim_end(vertex_count);
        self.indices.trim_end(index_count);
    }

    /// Mark every channel unprepared. Required before pooling.
    pub fn invalidate(&mut self) {
        self.positions.invalidate();
        self.uvs.invalidate();
        self.colors.invalidate();
        self.indices.invalidate();
    }

    /// Check if all four channels are prepared.
    pub fn is_prepared(&self) -> bool {
        self.prepared_states() == [true; 4]
    }

    /// Check if all four channels are unprepared.
    pub fn is_invalidated(&self) -> bool {
        self.prepared_states() == [false; 4]
    }

    fn prepared_states(&self) -> [bool; 4] {
        [
            self.positions.is_prepared(),
            self.uvs.is_prepared(),
            self.colors.is_prepared(),
            self.indices.is_prepared(),
        ]
    }

    /// Live vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Live indices.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Whole quads covered by the live vertices.
    pub fn quad_count(&self) -> usize {
        self.vertex_count() / 4
    }

    /// Check the builder structure in full.
    ///
    /// Walks every index; meant for tests and opt-in host checks, not the
    /// rebuild hot path.
    pub fn validate(&self) -> GeometryResult<()> {
        let [positions, uvs, colors, indices] = self.prepared_states();
        if !(positions && uvs && colors && indices) {
            return Err(GeometryError::InconsistentChannels(format!(
                "prepared: positions {positions}, uvs {uvs}, colors {colors}, indices {indices}"
            )));
        }

        let vertex_count = self.positions.len();
        if self.uvs.len() != vertex_count || self.colors.len() != vertex_count {
            return Err(GeometryError::StreamLengthMismatch {
                positions: vertex_count,
                uvs: self.uvs.len(),
                colors: self.colors.len(),
            });
        }
        if vertex_count > Index::MAX as usize + 1 {
            return Err(GeometryError::TooManyVertices(vertex_count));
        }

        let indices = self.indices.as_slice();
        if indices.len() % 3 != 0 {
            return Err(GeometryError::PartialTriangle(indices.len()));
        }
        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= vertex_count)
        {
            return Err(GeometryError::IndexOutOfRange {
                index,
                position,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Bounding rect of the live positions in the XY plane.
    pub fn bounds(&self) -> Option<Rect> {
        if !self.positions.is_prepared() {
            return None;
        }
        Rect::from_points(self.positions.as_slice().iter().map(|p| p.truncate()))
    }

    /// Offset every live position by `delta`.
    pub fn translate(&mut self, delta: Vec2) {
        let delta = delta.extend(0.0);
        for p in self.positions.edit() {
            *p += delta;
        }
    }

    /// Append the geometry of another prepared builder, rebasing its indices.
    pub fn append(&mut self, other: &MeshBuilder) {
        debug_assert!(
            self.is_prepared() && other.is_prepared(),
            "append requires two prepared builders"
        );
        let base_vertex = self.vertex_count();
        let base_index = self.index_count();
        let vertex_count = base_vertex + other.vertex_count();
        let index_count = base_index + other.index_count();
        debug_assert!(
            vertex_count <= Index::MAX as usize + 1,
            "append would exceed the 16-bit index limit with {vertex_count} vertices"
        );

        self.positions.resize(vertex_count)[base_vertex..]
            .copy_from_slice(other.positions.as_slice());
        self.uvs.resize(vertex_count)[base_vertex..].copy_from_slice(other.uvs.as_slice());
        self.colors.resize(vertex_count)[base_vertex..].copy_from_slice(other.colors.as_slice());

        let offset = base_vertex as Index;
        let dst = &mut self.indices.resize(index_count)[base_index..];
        for (d, s) in dst.iter_mut().zip(other.indices.as_slice()) {
            *d = *s + offset;
        }
    }

    /// Upload every channel into an empty `sink`, then signal bounds
    /// recomputation.
    pub fn fill_mesh<S: MeshSink + ?Sized>(&self, sink: &mut S) {
        crate::profile_function!();
        debug_assert!(
            self.is_prepared(),
            "fill_mesh on a builder that is not fully prepared: {:?}",
            self.prepared_states()
        );
        debug_assert_eq!(
            (self.uvs.len(), self.colors.len()),
            (self.positions.len(), self.positions.len()),
            "vertex streams disagree on vertex count"
        );
        debug_assert!(
            sink.is_empty(),
            "fill_mesh into a non-empty mesh with {} vertices and {} indices",
            sink.vertex_count(),
            sink.index_count()
        );

        self.positions.fill_mesh(sink, UploadFlags::FAST);
        self.uvs.fill_mesh(sink, UploadFlags::FAST);
        self.colors.fill_mesh(sink, UploadFlags::FAST);
        self.indices.fill_mesh(sink, UploadFlags::FAST);
        sink.recalculate_bounds();
    }

    /// [`fill_mesh`](Self::fill_mesh) followed by [`invalidate`](Self::invalidate).
    pub fn fill_mesh_and_invalidate<S: MeshSink + ?Sized>(&mut self, sink: &mut S) {
        self.fill_mesh(sink);
        self.invalidate();
    }

    /// Fill a pooled mesh, hand it to `target`, and return it cleared.
    ///
    /// Leaves this builder invalidated.
    pub fn set_mesh_and_invalidate<T: MeshTarget + ?Sized>(
        &mut self,
        meshes: &mut MeshPool,
        target: &mut T,
    ) {
        let mut mesh = meshes.rent();
        self.fill_mesh_and_invalidate(&mut mesh);
        target.set_mesh(&mesh);
        mesh.clear();
        meshes.give_back(mesh);
    }
}

impl std::fmt::Debug for MeshBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshBuilder")
            .field("id", &self.id)
            .field("positions", &self.positions)
            .field("uvs", &self.uvs)
            .field("colors", &self.colors)
            .field("indices", &self.indices)
            .finish()
    }
}
