//! Batched quad emission.

use glam::Vec2;

use crate::types::{Color32, Position, Uv};

use super::MeshBuilder;

/// Write the four corners of the rect spanning `a` to `b`.
///
/// Order: bottom-left, bottom-right, top-left, top-right.
pub(crate) fn write_rect<T>(dst: &mut [T], a: Vec2, b: Vec2, map: impl Fn(Vec2) -> T) {
    dst[0] = map(a);
    dst[1] = map(Vec2::new(b.x, a.y));
    dst[2] = map(Vec2::new(a.x, b.y));
    dst[3] = map(b);
}

/// Emits up to a fixed number of quads into a builder.
///
/// Position and UV channels are sized for `capacity` quads up front;
/// [`commit`](Self::commit) trims them to the quads actually added, fills
/// colors and binds the shared index pattern.
///
/// ```
/// use std::sync::Arc;
/// use glam::Vec2;
/// use redlilium_geometry::{Color32, GeometryCaches, MeshBuilder};
///
/// let mut builder = MeshBuilder::new(Arc::new(GeometryCaches::new()));
/// let mut batch = builder.quad_batch(8);
/// for i in 0..3 {
///     let x = i as f32 * 10.0;
///     batch.add(Vec2::new(x, 0.0), Vec2::new(x + 8.0, 12.0), Vec2::ZERO, Vec2::ONE);
/// }
/// batch.commit(Color32::WHITE);
///
/// assert_eq!(builder.vertex_count(), 12);
/// assert_eq!(builder.index_count(), 18);
/// ```
///
/// Dropping a batch without committing leaves the builder cleared.
pub struct QuadBatch<'a> {
    builder: &'a mut MeshBuilder,
    capacity: usize,
    quads: usize,
    committed: bool,
}

impl<'a> QuadBatch<'a> {
    pub(crate) fn new(builder: &'a mut MeshBuilder, capacity: usize) -> Self {
        builder.positions.set_up(capacity * 4);
        builder.uvs.set_up(capacity * 4);
        Self {
            builder,
            capacity,
            quads: 0,
            committed: false,
        }
    }

    /// Add an axis-aligned quad spanning `pos1` to `pos2`.
    pub fn add(&mut self, pos1: Vec2, pos2: Vec2, uv1: Vec2, uv2: Vec2) {
        let range = self.next_slot();
        write_rect(&mut self.builder.positions.edit()[range.clone()], pos1, pos2, |p| {
            p.extend(0.0)
        });
        write_rect(&mut self.builder.uvs.edit()[range], uv1, uv2, |uv| uv);
    }

    /// Add a quad from explicit corners, e.g. a rotated or skewed glyph.
    ///
    /// Corner order is bottom-left, bottom-right, top-left, top-right.
    pub fn add_corners(&mut self, positions: [Position; 4], uvs: [Uv; 4]) {
        let range = self.next_slot();
        self.builder.positions.edit()[range.clone()].copy_from_slice(&positions);
        self.builder.uvs.edit()[range].copy_from_slice(&uvs);
    }

    fn next_slot(&mut self) -> std::ops::Range<usize> {
        debug_assert!(
            self.quads < self.capacity,
            "quad batch full: capacity is {} quads",
            self.capacity
        );
        let start = self.quads * 4;
        self.quads += 1;
        start..start + 4
    }

    /// Quads added so far.
    pub fn len(&self) -> usize {
        self.quads
    }

    /// Check if no quad was added.
    pub fn is_empty(&self) -> bool {
        self.quads == 0
    }

    /// Maximum number of quads.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Quads that can still be added.
    pub fn remaining(&self) -> usize {
        self.capacity - self.quads
    }

    /// Finish the batch with a uniform `color`.
    pub fn commit(mut self, color: Color32) {
        let vertex_count = self.quads * 4;
        self.builder.positions.trim_end(vertex_count);
        self.builder.uvs.trim_end(vertex_count);
        self.builder.set_up_colors(color, vertex_count);
        self.builder.set_up_quad_indices(self.quads);
        self.committed = true;
    }
}

impl Drop for QuadBatch<'_> {
    fn drop(&mut self) {
        if !self.committed {
            log::warn!(
                "quad batch with {} quads dropped without commit, clearing builder",
                self.quads
            );
            self.builder.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use glam::Vec3;

    use crate::tables::GeometryCaches;

    fn builder() -> MeshBuilder {
        MeshBuilder::new(Arc::new(GeometryCaches::new()))
    }

    #[test]
    fn test_commit_trims_to_added_quads() {
        let mut builder = builder();
        let mut batch = builder.quad_batch(10);
        batch.add(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Vec2::ONE);
        batch.add(Vec2::new(2.0, 0.0), Vec2::new(3.0, 1.0), Vec2::ZERO, Vec2::ONE);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.remaining(), 8);
        batch.commit(Color32::WHITE);

        assert!(builder.is_prepared());
        assert_eq!(builder.vertex_count(), 8);
        assert_eq!(builder.uvs.len(), 8);
        assert_eq!(builder.colors.len(), 8);
        assert_eq!(
            builder.indices.as_slice(),
            &[0, 2, 3, 3, 1, 0, 4, 6, 7, 7, 5, 4]
        );
        assert_eq!(builder.positions.as_slice()[4], Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(builder.positions.as_slice()[7], Vec3::new(3.0, 1.0, 0.0));
        assert!(builder.validate().is_ok());
    }

    #[test]
    fn test_add_corners() {
        let mut builder = builder();
        let corners = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
        ];
        let uvs = [Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE];
        let mut batch = builder.quad_batch(1);
        batch.add_corners(corners, uvs);
        batch.commit(Color32::new(10, 20, 30, 40));

        assert_eq!(builder.positions.as_slice(), &corners);
        assert_eq!(builder.uvs.as_slice(), &uvs);
        assert_eq!(builder.colors.as_slice(), &[Color32::new(10, 20, 30, 40); 4]);
    }

    #[test]
    fn test_empty_commit() {
        let mut builder = builder();
        let batch = builder.quad_batch(4);
        assert!(batch.is_empty());
        batch.commit(Color32::WHITE);

        assert!(builder.is_prepared());
        assert_eq!(builder.vertex_count(), 0);
        assert_eq!(builder.index_count(), 0);
    }

    #[test]
    fn test_drop_without_commit_clears() {
        let mut builder = builder();
        {
            let mut batch = builder.quad_batch(2);
            batch.add(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Vec2::ONE);
        }
        assert!(builder.is_prepared());
        assert_eq!(builder.vertex_count(), 0);
        assert!(builder.validate().is_ok());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "quad batch full")]
    fn test_add_past_capacity_panics() {
        let mut builder = builder();
        let mut batch = builder.quad_batch(1);
        batch.add(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Vec2::ONE);
        batch.add(Vec2::ZERO, Vec2::ONE, Vec2::ZERO, Vec2::ONE);
    }
}
