//! Shared geometry caches.
//!
//! Two tables serve read-only data that many builders bind as borrowed
//! channel views:
//!
//! - [`QuadIndexTable`] - triangle indices for N quads
//! - [`SolidColorTable`] - uniform opaque / clear white color streams
//!
//! [`GeometryCaches`] bundles both behind locks so one instance can be
//! shared by every builder. Growth replaces the table's array; buffers
//! handed out earlier stay valid and unchanged.

mod quad_indices;
mod solid_colors;

pub use quad_indices::{QUAD_TRIANGLES, QuadIndexTable, write_quad_indices};
pub use solid_colors::SolidColorTable;

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use static_assertions::assert_impl_all;

use crate::channel::SharedBuffer;
use crate::config::GeometryConfig;
use crate::error::GeometryResult;
use crate::types::{Color32, Index};

/// Process-wide caches shared by builders.
///
/// Hosts normally use [`GeometryCaches::global`]; tests construct their own
/// instance so they start from an empty cache.
///
/// # Locking
///
/// Builders themselves never lock. The caches are the one piece of state
/// shared across builders, and they sit behind `parking_lot` mutexes so a
/// single instance can serve builders on several threads. Each lock is held
/// only for the duration of one lookup or growth, and is uncontended when
/// every rebuild runs on one thread. A lookup costs one lock:
/// [`MeshBuilder::set_up_quad`](crate::MeshBuilder::set_up_quad) takes two
/// (colors and indices), and a [`BuilderPool`](crate::BuilderPool) takes one
/// per rent or return.
#[derive(Debug)]
pub struct GeometryCaches {
    config: GeometryConfig,
    quad_indices: Mutex<QuadIndexTable>,
    solid_colors: Mutex<SolidColorTable>,
}

impl GeometryCaches {
    /// Create caches with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_config(GeometryConfig::default())
    }

    /// Create caches with a custom configuration.
    pub fn with_config(config: GeometryConfig) -> GeometryResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: GeometryConfig) -> Self {
        Self {
            config,
            quad_indices: Mutex::new(QuadIndexTable::new(
                config.min_quad_count,
                config.max_quad_count,
            )),
            solid_colors: Mutex::new(SolidColorTable::new()),
        }
    }

    /// The process-wide instance, created with the default configuration on
    /// first use.
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<GeometryCaches>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(Self::new())).clone()
    }

    /// Configuration these caches were built with.
    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Indices for `quad_count` quads. See [`QuadIndexTable::get`].
    pub fn quad_indices(&self, quad_count: usize) -> SharedBuffer<Index> {
        self.quad_indices.lock().get(quad_count)
    }

    /// Quads currently covered by the shared index array.
    pub fn cached_quad_count(&self) -> usize {
        self.quad_indices.lock().quad_count()
    }

    /// A uniform color stream, if `color` has a shared one. See
    /// [`SolidColorTable::try_get`].
    pub fn solid_colors(&self, color: Color32, count: usize) -> Option<SharedBuffer<Color32>> {
        self.solid_colors.lock().try_get(color, count)
    }
}

assert_impl_all!(GeometryCaches: Send, Sync);

impl Default for GeometryCaches {
    fn default() -> Self {
        Self::new()
    }
}
