//! # meshless-types
//!
//! Shared types, identifiers, error types, and numerical constants
//! for the meshless shape-matching engine.
//!
//! This crate has no domain logic. It defines the vocabulary
//! that all other meshless crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{MeshlessError, MeshlessResult};
pub use ids::{ParticleId, VertexId};
