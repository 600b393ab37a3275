//! # meshless-math
//!
//! Linear algebra primitives for the meshless shape-matching engine.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `DVec3`, `DMat3`, etc.)
//! - [`Mat3x9`] and [`Mat9`] for the quadratic deformation model
//! - Denman–Beavers matrix square root and polar decomposition
//! - Sign-preserving roots for volume normalization
//! - Symmetric pseudo-inverse and eigendecomposition backed by `faer`

pub mod decomposition;
pub mod mat3x9;
pub mod mat9;
pub mod symmetric;

pub use decomposition::{PolarDecomposition, PolarMethod};
pub use mat3x9::Mat3x9;
pub use mat9::Mat9;

// Re-export glam types as the canonical math types.
pub use glam::{DMat3, DVec3, Mat3, Vec3};

/// Outer product `a · bᵀ` of two 3-vectors.
#[inline]
pub fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}
