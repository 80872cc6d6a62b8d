//! Cached triangle indices for quad batches.

use std::sync::Arc;

use crate::channel::SharedBuffer;
use crate::types::{Index, MAX_INDEXABLE_QUADS};

/// Index pattern of one quad.
///
/// Vertex order is bottom-left, bottom-right, top-left, top-right; this
/// winding gives front-facing triangles.
pub const QUAD_TRIANGLES: [Index; 6] = [0, 2, 3, 3, 1, 0];

/// Write the pattern for consecutive quads, starting at quad `first_quad`.
///
/// `dst.len()` must be a multiple of 6. Quads at or past
/// [`MAX_INDEXABLE_QUADS`] cannot be addressed and are written as degenerate
/// triangles on vertex 0.
pub fn write_quad_indices(dst: &mut [Index], first_quad: usize) {
    debug_assert_eq!(dst.len() % 6, 0, "quad index slice must hold whole quads");
    for (i, quad) in dst.chunks_exact_mut(6).enumerate() {
        let k = first_quad + i;
        if k >= MAX_INDEXABLE_QUADS {
            quad.fill(0);
            continue;
        }
        let base = (k * 4) as Index;
        for (slot, offset) in quad.iter_mut().zip(QUAD_TRIANGLES) {
            *slot = base + offset;
        }
    }
}

/// A growable shared index array for quad batches.
///
/// Requests up to the cached quad count are served as a prefix of the
/// shared array. Larger requests grow it geometrically up to
/// `max_quad_count`; anything beyond gets a one-off array that is not
/// retained.
#[derive(Debug)]
pub struct QuadIndexTable {
    indices: Arc<[Index]>,
    quad_count: usize,
    min_quad_count: usize,
    max_quad_count: usize,
}

impl QuadIndexTable {
    /// Create an empty table growing between `min_quad_count` and
    /// `max_quad_count` quads.
    pub fn new(min_quad_count: usize, max_quad_count: usize) -> Self {
        debug_assert!(
            min_quad_count <= max_quad_count && max_quad_count <= MAX_INDEXABLE_QUADS,
            "invalid quad index table range {min_quad_count}..={max_quad_count}"
        );
        Self {
            indices: Arc::from(Vec::new()),
            quad_count: 0,
            min_quad_count,
            max_quad_count,
        }
    }

    /// Quads covered by the shared array.
    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    /// Indices for `quad_count` quads, `6 * quad_count` long.
    ///
    /// Requests above [`MAX_INDEXABLE_QUADS`] are capped to it.
    pub fn get(&mut self, quad_count: usize) -> SharedBuffer<Index> {
        let quad_count = if quad_count > MAX_INDEXABLE_QUADS {
            log::error!(
                "{quad_count} quads exceed the 16-bit index limit, capping at {MAX_INDEXABLE_QUADS}"
            );
            MAX_INDEXABLE_QUADS
        } else {
            quad_count
        };
        if quad_count > self.quad_count && self.quad_count < self.max_quad_count {
            self.grow(quad_count);
        }
        if quad_count <= self.quad_count {
            return SharedBuffer::with_len(self.indices.clone(), quad_count * 6);
        }

        log::warn!(
            "{quad_count} quads exceed the cached index table of {} quads, building an uncached array",
            self.max_quad_count
        );
        SharedBuffer::from(self.build(quad_count))
    }

    fn grow(&mut self, requested: usize) {
        crate::profile_function!();
        let target = requested
            .max(self.quad_count * 2)
            .clamp(self.min_quad_count, self.max_quad_count);
        log::trace!(
            "growing quad index table from {} to {target} quads",
            self.quad_count
        );
        self.indices = self.build(target).into();
        self.quad_count = target;
        crate::profile_plot!("quad_index_table_quads", target);
    }

    /// Copy the cached prefix and extend it to `quad_count` quads.
    fn build(&self, quad_count: usize) -> Vec<Index> {
        debug_assert!(
            quad_count <= MAX_INDEXABLE_QUADS,
            "{quad_count} quads exceed the 16-bit index limit"
        );
        let cached = self.quad_count.min(quad_count);
        let mut indices = Vec::with_capacity(quad_count * 6);
        indices.extend_from_slice(&self.indices[..cached * 6]);
        indices.resize(quad_count * 6, 0);
        write_quad_indices(&mut indices[cached * 6..], cached);
        indices
    }
}
