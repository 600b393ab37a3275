//! Error types for the meshless engine.
//!
//! All crates return `MeshlessResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the meshless engine.
#[derive(Debug, Error)]
pub enum MeshlessError {
    /// The vertex stream carries more than positions.
    #[error("Invalid vertex layout: {0}")]
    InvalidVertexLayout(String),

    /// Mesh data is malformed or inconsistent.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// No particles survived deduplication.
    #[error("Point cloud is empty")]
    EmptyPointCloud,

    /// A coordinate is NaN or infinite.
    #[error("Non-finite coordinate at vertex {index}")]
    NonFiniteCoordinate { index: usize },

    /// The rest configuration cannot support shape matching.
    #[error("Degenerate rest shape: {0}")]
    DegenerateRestShape(String),

    /// Timestep is zero, negative, or not finite.
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(f32),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Particle index is out of range.
    #[error("Particle index {index} out of bounds (count: {count})")]
    ParticleOutOfBounds { index: usize, count: usize },

    /// A numerical routine could not produce a usable result.
    #[error("Numerical failure: {0}")]
    Numerical(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, MeshlessError>`.
pub type MeshlessResult<T> = Result<T, MeshlessError>;
