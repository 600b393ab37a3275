//! Matrix roots and polar decomposition for shape matching.
//!
//! Provides the Denman–Beavers square root (`S = sqrt(Apqᵀ Apq)`), the
//! polar factor `R = Apq · S⁻¹`, and the sign-preserving roots used to
//! normalize deformation matrices to unit volume.

use glam::{DMat3, DVec3};
use meshless_types::constants::DEGENERATE_DETERMINANT;

use crate::mat3x9::Mat3x9;
use crate::symmetric::eigen3;

/// Which path produced a polar decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarMethod {
    /// Fixed-budget Denman–Beavers iteration.
    DenmanBeavers,
    /// Eigendecomposition with pseudo-inverted singular values.
    /// Used when `ApqᵀApq` is singular.
    Eigen,
}

/// Result of a 3×3 polar decomposition: A = R · S
#[derive(Debug, Clone, Copy)]
pub struct PolarDecomposition {
    /// Orthogonal factor. A partial isometry when A is rank-deficient.
    pub rotation: DMat3,
    /// Symmetric positive semi-definite stretch `S = sqrt(AᵀA)`.
    pub stretch: DMat3,
    /// The path that produced this result.
    pub method: PolarMethod,
}

/// Square root of a matrix together with its inverse.
#[derive(Debug, Clone, Copy)]
pub struct SquareRoot {
    pub sqrt: DMat3,
    pub inv_sqrt: DMat3,
}

/// Computes `value^(1/degree)` preserving the sign of `value`.
///
/// Negative inputs return `-|value|^(1/degree)` so reflections keep a
/// meaningful scale instead of producing NaN. Values within
/// [`DEGENERATE_DETERMINANT`] of zero return 1 (no rescaling).
pub fn signed_root(value: f64, degree: f64) -> f64 {
    if value.abs() < DEGENERATE_DETERMINANT {
        1.0
    } else if value < 0.0 {
        -(-value).powf(1.0 / degree)
    } else {
        value.powf(1.0 / degree)
    }
}

/// Returns true if `m` can be safely inverted.
///
/// The determinant is compared against the cube of the Frobenius norm so
/// the test is independent of the overall scale of `m`.
pub fn is_invertible(m: &DMat3) -> bool {
    let norm_sq = m.x_axis.length_squared() + m.y_axis.length_squared() + m.z_axis.length_squared();
    let scale = norm_sq.sqrt().powi(3);
    let det = m.determinant();
    det.is_finite() && scale > 0.0 && det.abs() > DEGENERATE_DETERMINANT * scale
}

/// Rescales a 3×3 deformation matrix to unit determinant.
///
/// Returns the scaled matrix and the determinant before scaling.
pub fn normalize_volume3(a: DMat3) -> (DMat3, f64) {
    let det = a.determinant();
    (a * (1.0 / signed_root(det, 3.0)), det)
}

/// Rescales a 3×9 quadratic deformation matrix.
///
/// The volume is measured on the 9×9 embedding `[Ã; 0 I₆]` and the ninth
/// root is taken (nine degrees of freedom). Returns the scaled matrix and
/// the embedded determinant before scaling.
pub fn normalize_volume9(a: Mat3x9) -> (Mat3x9, f64) {
    let det = a.embedded_determinant();
    (a * (1.0 / signed_root(det, 9.0)), det)
}

/// Denman–Beavers iteration for the square root of `m`.
///
/// Starting from `M₁ = m`, `M₂ = I`, each round updates
/// `M₁ ← ½(M₁ + M₂⁻¹)` and `M₂ ← ½(M₂ + M₁⁻¹)` using the previous iterates.
/// `M₁` converges to `sqrt(m)` and `M₂` to its inverse. The iteration count
/// is fixed; there is no convergence test.
///
/// Returns `None` if an iterate becomes singular or non-finite.
pub fn sqrt_denman_beavers(m: DMat3, iterations: u32) -> Option<SquareRoot> {
    let mut m1 = m;
    let mut m2 = DMat3::IDENTITY;

    for _ in 0..iterations {
        if !is_invertible(&m1) || !is_invertible(&m2) {
            return None;
        }
        let inv1 = m1.inverse();
        let inv2 = m2.inverse();
        m1 = (m1 + inv2) * 0.5;
        m2 = (m2 + inv1) * 0.5;
    }

    if m1.is_finite() && m2.is_finite() {
        Some(SquareRoot {
            sqrt: m1,
            inv_sqrt: m2,
        })
    } else {
        None
    }
}

/// Square root of a symmetric positive semi-definite matrix by
/// eigendecomposition. Eigenvalues below the relative cutoff are treated
/// as zero and left out of the inverse.
fn sqrt_eigen(m: DMat3) -> Option<SquareRoot> {
    let (values, basis) = eigen3(m).ok()?;
    let largest = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let cutoff = largest.sqrt() * 1.0e-6;

    let mut root = DVec3::ZERO;
    let mut inv_root = DVec3::ZERO;
    for k in 0..3 {
        let s = values[k].max(0.0).sqrt();
        root[k] = s;
        inv_root[k] = if s > cutoff && s > 0.0 { 1.0 / s } else { 0.0 };
    }

    let bt = basis.transpose();
    Some(SquareRoot {
        sqrt: basis * DMat3::from_diagonal(root) * bt,
        inv_sqrt: basis * DMat3::from_diagonal(inv_root) * bt,
    })
}

/// Polar decomposition of a 3×3 matrix: `A = R · S`.
///
/// `S = sqrt(AᵀA)` is computed by Denman–Beavers with the given number of
/// rounds and `R = A · S⁻¹`. When `AᵀA` is singular (collinear or coplanar
/// particle clouds) the iteration is undefined, so the eigen path is used
/// and `R = A · S⁺`.
pub fn polar_decomposition(a: DMat3, iterations: u32) -> PolarDecomposition {
    let c = a.transpose() * a;

    if is_invertible(&c) {
        if let Some(root) = sqrt_denman_beavers(c, iterations) {
            return PolarDecomposition {
                rotation: a * root.inv_sqrt,
                stretch: root.sqrt,
                method: PolarMethod::DenmanBeavers,
            };
        }
    }

    tracing::debug!("polar decomposition falling back to eigen path");
    match sqrt_eigen(c) {
        Some(root) => PolarDecomposition {
            rotation: a * root.inv_sqrt,
            stretch: root.sqrt,
            method: PolarMethod::Eigen,
        },
        None => PolarDecomposition {
            rotation: DMat3::IDENTITY,
            stretch: DMat3::ZERO,
            method: PolarMethod::Eigen,
        },
    }
}
