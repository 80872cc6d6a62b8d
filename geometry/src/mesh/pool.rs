//! Pool of backing meshes.

use crate::pool::FreeList;

use super::data::BackingMesh;
use super::sink::MeshSink;

/// A free list of [`BackingMesh`] resources.
///
/// Rented meshes belong to the renter until given back. A mesh must be
/// cleared before it is given back.
#[derive(Debug)]
pub struct MeshPool {
    free: FreeList<BackingMesh>,
}

impl MeshPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            free: FreeList::new("mesh"),
        }
    }

    /// Take an empty mesh, constructing one if the pool is dry.
    pub fn rent(&mut self) -> BackingMesh {
        self.free.pop_or_create(BackingMesh::new)
    }

    /// Return a mesh. It must be empty.
    pub fn give_back(&mut self, mesh: BackingMesh) {
        debug_assert!(
            mesh.is_empty(),
            "mesh given back to pool with {} vertices and {} indices",
            mesh.vertex_count(),
            mesh.index_count()
        );
        self.free.push(mesh);
    }

    /// Construct meshes until at least `count` are idle.
    pub fn prewarm(&mut self, count: usize) {
        self.free.prewarm(count, BackingMesh::new);
    }

    /// Number of idle meshes.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Check if no mesh is idle.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Total meshes this pool constructed.
    pub fn created(&self) -> usize {
        self.free.created()
    }
}

impl Default for MeshPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::UploadFlags;
    use glam::Vec3;

    #[test]
    fn test_rent_reuses_returned_mesh() {
        let mut pool = MeshPool::new();
        let mesh = pool.rent();
        assert_eq!(pool.created(), 1);

        pool.give_back(mesh);
        assert_eq!(pool.len(), 1);

        let _mesh = pool.rent();
        assert_eq!(pool.created(), 1);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_prewarm() {
        let mut pool = MeshPool::new();
        pool.prewarm(4);
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.created(), 4);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "given back to pool")]
    fn test_give_back_non_empty_panics() {
        let mut pool = MeshPool::new();
        let mut mesh = pool.rent();
        mesh.set_positions(&[Vec3::ZERO], UploadFlags::FAST);
        pool.give_back(mesh);
    }
}
