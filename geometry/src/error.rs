//! Geometry error types.
//!
//! Protocol violations (double set-up, returning live builders to a pool,
//! filling a non-empty mesh) are debug assertions, not errors. This type only
//! covers the surfaces that validate on request.

use thiserror::Error;

/// Errors reported by configuration and explicit validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// The geometry configuration is unusable.
    #[error("invalid geometry config: {0}")]
    InvalidConfig(String),
    /// The builder channels disagree on whether they are prepared.
    #[error("builder channels are inconsistent: {0}")]
    InconsistentChannels(String),
    /// The per-vertex streams have different lengths.
    #[error("vertex stream length mismatch: positions {positions}, uvs {uvs}, colors {colors}")]
    StreamLengthMismatch {
        /// Live position count.
        positions: usize,
        /// Live UV count.
        uvs: usize,
        /// Live color count.
        colors: usize,
    },
    /// The index stream does not describe whole triangles.
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),
    /// An index addresses a vertex outside the live range.
    #[error("index {index} at position {position} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index value.
        index: u16,
        /// Location of the index in the stream.
        position: usize,
        /// Live vertex count.
        vertex_count: usize,
    },
    /// More vertices than a 16-bit index can address.
    #[error("{0} vertices exceed the 16-bit index limit")]
    TooManyVertices(usize),
}

/// Result alias for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
