//! # RedLilium Geometry
//!
//! Retained-mode geometry buffers for UI glyphs, sprites, shadows and
//! particle bakes. Every visual rebuild goes through this crate, so the
//! steady state allocates nothing:
//!
//! - [`Channel`] - a copy-on-write attribute stream (positions, UVs, colors, indices)
//! - [`MeshBuilder`] - four channels forming one mesh generation pass
//! - [`QuadIndexTable`] / [`SolidColorTable`] - shared caches bound as borrowed views
//! - [`BuilderPool`] / [`MeshPool`] - free lists for builders and backing meshes
//! - [`Duplicator`] / [`ShadowEffect`] - shadow and outline copies of existing geometry
//!
//! # Example
//!
//! ```
//! use redlilium_geometry::{BackingMesh, BuilderPool, Color32, GeometryCaches, MeshSink};
//! use glam::Vec2;
//!
//! let pool = BuilderPool::new(GeometryCaches::global());
//! let mut mesh = BackingMesh::new();
//!
//! let mut builder = pool.rent();
//! builder.set_up_quad(
//!     Vec2::new(0.0, 0.0),
//!     Vec2::new(10.0, 10.0),
//!     Vec2::ZERO,
//!     Vec2::ONE,
//!     Color32::WHITE,
//! );
//! builder.fill_mesh_and_invalidate(&mut mesh);
//! drop(builder); // back to the pool
//!
//! assert_eq!(mesh.vertex_count(), 4);
//! assert_eq!(mesh.index_count(), 6);
//! ```

pub mod builder;
pub mod channel;
pub mod config;
pub mod effects;
pub mod error;
pub mod mesh;
pub mod pool;
pub mod profiling;
pub mod tables;
pub mod types;

pub use builder::{BuilderPool, MeshBuilder, PooledBuilder, QuadBatch};
pub use channel::{AttributeKind, Channel, ChannelElement, SharedBuffer};
pub use config::GeometryConfig;
pub use effects::{Duplicator, ShadowEffect, ShadowStyle};
pub use error::{GeometryError, GeometryResult};
pub use mesh::{BackingMesh, MeshPool, MeshSink, MeshTarget, UploadFlags};
pub use tables::{GeometryCaches, QuadIndexTable, SolidColorTable};
pub use types::{Color32, Index, MAX_INDEXABLE_QUADS, Position, Rect, Uv};

/// Geometry library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
