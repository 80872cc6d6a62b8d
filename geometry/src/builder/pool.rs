//! Pool of mesh builders.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::pool::FreeList;
use crate::tables::GeometryCaches;

use super::MeshBuilder;

type SharedFreeList = Arc<Mutex<FreeList<MeshBuilder>>>;

/// A free list of [`MeshBuilder`]s sharing one set of caches.
///
/// [`rent`](Self::rent) hands out a [`PooledBuilder`] guard that
/// invalidates and returns the builder when dropped. The explicit
/// [`take`](Self::take) / [`give_back`](Self::give_back) pair is available
/// for builders that must outlive a scope; `give_back` requires the builder
/// to be invalidated already.
///
/// ```
/// use redlilium_geometry::{BuilderPool, GeometryCaches};
///
/// let pool = BuilderPool::new(GeometryCaches::global());
/// {
///     let mut builder = pool.rent();
///     builder.set_up_empty();
/// } // invalidated and returned here
/// assert_eq!(pool.len(), 1);
/// ```
#[derive(Clone)]
pub struct BuilderPool {
    caches: Arc<GeometryCaches>,
    free: SharedFreeList,
}

impl BuilderPool {
    /// Create an empty pool whose builders bind data from `caches`.
    pub fn new(caches: Arc<GeometryCaches>) -> Self {
        Self {
            caches,
            free: Arc::new(Mutex::new(FreeList::new("mesh builder"))),
        }
    }

    /// Rent a builder for the current scope.
    pub fn rent(&self) -> PooledBuilder {
        PooledBuilder {
            builder: Some(self.take()),
            free: self.free.clone(),
        }
    }

    /// Take a builder out of the pool without a guard.
    pub fn take(&self) -> MeshBuilder {
        self.free
            .lock()
            .pop_or_create(|| MeshBuilder::new(self.caches.clone()))
    }

    /// Return a builder taken with [`take`](Self::take). It must be
    /// invalidated.
    pub fn give_back(&self, builder: MeshBuilder) {
        release(&self.free, builder);
    }

    /// Construct builders until at least `count` are idle.
    pub fn prewarm(&self, count: usize) {
        let caches = &self.caches;
        self.free
            .lock()
            .prewarm(count, || MeshBuilder::new(caches.clone()));
    }

    /// Number of idle builders.
    pub fn len(&self) -> usize {
        self.free.lock().len()
    }

    /// Check if no builder is idle.
    pub fn is_empty(&self) -> bool {
        self.free.lock().is_empty()
    }

    /// Total builders this pool constructed.
    pub fn created(&self) -> usize {
        self.free.lock().created()
    }

    /// Caches shared by this pool's builders.
    pub fn caches(&self) -> &Arc<GeometryCaches> {
        &self.caches
    }
}

impl std::fmt::Debug for BuilderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let free = self.free.lock();
        f.debug_struct("BuilderPool")
            .field("idle", &free.len())
            .field("created", &free.created())
            .finish()
    }
}

fn release(free: &Mutex<FreeList<MeshBuilder>>, builder: MeshBuilder) {
    debug_assert!(
        builder.is_invalidated(),
        "builder {} returned to pool without invalidate: {:?}",
        builder.id(),
        builder
    );
    let mut free = free.lock();
    debug_assert!(
        !free.iter().any(|pooled| pooled.id() == builder.id()),
        "builder {} returned to pool twice",
        builder.id()
    );
    free.push(builder);
}

/// A rented [`MeshBuilder`] that goes back to its pool when dropped.
///
/// Dropping invalidates the builder first, so live data never reaches the
/// pool.
pub struct PooledBuilder {
    builder: Option<MeshBuilder>,
    free: SharedFreeList,
}

impl PooledBuilder {
    /// Keep the builder instead of returning it to the pool.
    pub fn detach(mut self) -> MeshBuilder {
        match self.builder.take() {
            Some(builder) => builder,
            None => unreachable!("pooled builder already released"),
        }
    }
}

impl Deref for PooledBuilder {
    type Target = MeshBuilder;

    fn deref(&self) -> &MeshBuilder {
        match &self.builder {
            Some(builder) => builder,
            None => unreachable!("pooled builder already released"),
        }
    }
}

impl DerefMut for PooledBuilder {
    fn deref_mut(&mut self) -> &mut MeshBuilder {
        match &mut self.builder {
            Some(builder) => builder,
            None => unreachable!("pooled builder already released"),
        }
    }
}

impl Drop for PooledBuilder {
    fn drop(&mut self) {
        if let Some(mut builder) = self.builder.take() {
            builder.invalidate();
            release(&self.free, builder);
        }
    }
}

impl std::fmt::Debug for PooledBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PooledBuilder").field(&self.builder).finish()
    }
}
