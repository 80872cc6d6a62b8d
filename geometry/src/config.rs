//! Tuning knobs for the shared geometry caches and fresh builders.

use crate::error::{GeometryError, GeometryResult};
use crate::types::MAX_INDEXABLE_QUADS;

/// Configuration for [`GeometryCaches`](crate::GeometryCaches) and the
/// builders created against them.
///
/// # Example
///
/// ```
/// use redlilium_geometry::GeometryConfig;
///
/// let config = GeometryConfig::default()
///     .with_quad_range(16, 1024)
///     .with_initial_vertex_capacity(256);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryConfig {
    /// Smallest quad count the shared index table grows to.
    pub min_quad_count: usize,
    /// Largest quad count the shared index table retains. Requests above this
    /// get a one-off array.
    pub max_quad_count: usize,
    /// Backing store length for the per-vertex channels of a new builder.
    pub initial_vertex_capacity: usize,
    /// Backing store length for the index channel of a new builder.
    pub initial_index_capacity: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            min_quad_count: 64,
            max_quad_count: 4096,
            initial_vertex_capacity: 64,
            initial_index_capacity: 96,
        }
    }
}

impl GeometryConfig {
    /// Set the growth range of the shared quad index table.
    pub fn with_quad_range(mut self, min: usize, max: usize) -> Self {
        self.min_quad_count = min;
        self.max_quad_count = max;
        self
    }

    /// Set the initial per-vertex channel capacity.
    pub fn with_initial_vertex_capacity(mut self, capacity: usize) -> Self {
        self.initial_vertex_capacity = capacity;
        self
    }

    /// Set the initial index channel capacity.
    pub fn with_initial_index_capacity(mut self, capacity: usize) -> Self {
        self.initial_index_capacity = capacity;
        self
    }

    /// Check that the quad range is usable with 16-bit indices.
    pub fn validate(&self) -> GeometryResult<()> {
        if self.min_quad_count == 0 {
            return Err(GeometryError::InvalidConfig(
                "min_quad_count cannot be zero".to_string(),
            ));
        }
        if self.min_quad_count > self.max_quad_count {
            return Err(GeometryError::InvalidConfig(format!(
                "min_quad_count {} exceeds max_quad_count {}",
                self.min_quad_count, self.max_quad_count
            )));
        }
        if self.max_quad_count > MAX_INDEXABLE_QUADS {
            return Err(GeometryError::InvalidConfig(format!(
                "max_quad_count {} exceeds the 16-bit limit of {MAX_INDEXABLE_QUADS} quads",
                self.max_quad_count
            )));
        }
        Ok(())
    }
}
