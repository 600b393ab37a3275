//! # meshless-solver
//!
//! Meshless deformation by shape matching for a single deformable body.
//!
//! ## Key Types
//!
//! - [`ShapeMatchingSolver`]: Owns the particle state and advances it one
//!   step at a time toward a goal shape that blends the best-fit rotation
//!   with a linear or quadratic deformation.
//! - [`RestShape`]: One-time preprocessing of the rest configuration
//!   (center of mass, relative positions, quadratic basis, inverse
//!   correlation matrices).
//! - [`ParticleState`]: SoA buffers for positions and velocities.
//! - [`SolverConfig`]: Stiffness, blend, deformation model, iteration budget.

pub mod config;
pub mod rest_shape;
pub mod shape_matching;
pub mod state;
pub mod step;

pub use config::{DeformationMode, SolverConfig};
pub use rest_shape::RestShape;
pub use shape_matching::ShapeMatchingSolver;
pub use state::ParticleState;
pub use step::StepResult;
