//! Symmetric eigendecomposition and pseudo-inverse backed by `faer`.
//!
//! The rest correlation matrices `Aqq` (3×3) and `Aqq̃` (9×9) are symmetric
//! positive semi-definite. Inverting them through the eigendecomposition
//! gives a Moore–Penrose pseudo-inverse and the numerical rank in one pass,
//! so collinear or coplanar clouds get a least-squares fit instead of
//! garbage from a singular inverse.
//!
//! All work happens in f64.

use faer::{Mat, Side};
use glam::DMat3;
use meshless_types::constants::PSEUDO_INVERSE_RCOND;
use meshless_types::{MeshlessError, MeshlessResult};

use crate::mat9::Mat9;

/// Result of a symmetric pseudo-inversion.
#[derive(Debug, Clone)]
pub struct PseudoInverse<M> {
    /// The pseudo-inverse. Equal to the true inverse when `rank` is full.
    pub matrix: M,
    /// Number of eigenvalues above the relative cutoff.
    pub rank: usize,
}

impl<M> PseudoInverse<M> {
    /// Returns true if the source matrix was full rank.
    pub fn is_full_rank(&self, dimension: usize) -> bool {
        self.rank == dimension
    }
}

/// Eigenvalues (ascending) and eigenvectors (as columns) of a symmetric
/// matrix given in row-major order.
fn eigen(data: &[f64], n: usize) -> MeshlessResult<(Vec<f64>, Mat<f64>)> {
    debug_assert_eq!(data.len(), n * n);
    let m: Mat<f64> = Mat::from_fn(n, n, |i, j| data[i * n + j]);

    let evd = m
        .as_ref()
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| MeshlessError::Numerical(format!("Eigendecomposition failed: {e:?}")))?;

    let s = evd.S().column_vector();
    let values: Vec<f64> = (0..n).map(|k| s[k]).collect();
    let u = evd.U();
    let vectors: Mat<f64> = Mat::from_fn(n, n, |i, j| u[(i, j)]);

    if values.iter().any(|v| !v.is_finite()) {
        return Err(MeshlessError::Numerical(
            "Eigendecomposition produced non-finite eigenvalues".into(),
        ));
    }
    Ok((values, vectors))
}

/// Pseudo-inverse of a symmetric matrix in row-major order.
fn pseudo_inverse(data: &[f64], n: usize) -> MeshlessResult<PseudoInverse<Vec<f64>>> {
    let (values, vectors) = eigen(data, n)?;

    let largest = values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let cutoff = largest * PSEUDO_INVERSE_RCOND;

    let inverted: Vec<f64> = values
        .iter()
        .map(|&v| if largest > 0.0 && v.abs() > cutoff { 1.0 / v } else { 0.0 })
        .collect();
    let rank = inverted.iter().filter(|v| **v != 0.0).count();

    // M⁺ = V · diag(1/λ) · Vᵀ
    let mut matrix = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let mut sum = 0.0;
            for (k, inv) in inverted.iter().enumerate() {
                sum += vectors[(i, k)] * inv * vectors[(j, k)];
            }
            matrix[i * n + j] = sum;
        }
    }

    Ok(PseudoInverse { matrix, rank })
}

fn dmat3_to_rows(m: DMat3) -> [f64; 9] {
    let mut rows = [0.0; 9];
    for r in 0..3 {
        for c in 0..3 {
            rows[r * 3 + c] = m.col(c)[r];
        }
    }
    rows
}

fn rows_to_dmat3(rows: &[f64]) -> DMat3 {
    DMat3::from_cols_array(&[
        rows[0], rows[3], rows[6], //
        rows[1], rows[4], rows[7], //
        rows[2], rows[5], rows[8],
    ])
}

/// Pseudo-inverse of a symmetric 3×3 matrix.
pub fn pseudo_inverse3(m: DMat3) -> MeshlessResult<PseudoInverse<DMat3>> {
    let pinv = pseudo_inverse(&dmat3_to_rows(m), 3)?;
    Ok(PseudoInverse {
        matrix: rows_to_dmat3(&pinv.matrix),
        rank: pinv.rank,
    })
}

/// Pseudo-inverse of a symmetric 9×9 matrix.
pub fn pseudo_inverse9(m: &Mat9) -> MeshlessResult<PseudoInverse<Mat9>> {
    let flat: Vec<f64> = m.rows.iter().flat_map(|r| r.iter().copied()).collect();
    let pinv = pseudo_inverse(&flat, 9)?;

    let mut matrix = Mat9::ZERO;
    for (r, row) in matrix.rows.iter_mut().enumerate() {
        row.copy_from_slice(&pinv.matrix[r * 9..(r + 1) * 9]);
    }
    Ok(PseudoInverse {
        matrix,
        rank: pinv.rank,
    })
}

/// Eigendecomposition of a symmetric 3×3 matrix.
///
/// Returns eigenvalues in ascending order and the matching unit
/// eigenvectors as the columns of a `DMat3`.
pub fn eigen3(m: DMat3) -> MeshlessResult<([f64; 3], DMat3)> {
    let (values, vectors) = eigen(&dmat3_to_rows(m), 3)?;
    let basis = DMat3::from_cols_array(&[
        vectors[(0, 0)], vectors[(1, 0)], vectors[(2, 0)], //
        vectors[(0, 1)], vectors[(1, 1)], vectors[(2, 1)], //
        vectors[(0, 2)], vectors[(1, 2)], vectors[(2, 2)],
    ]);
    Ok(([values[0], values[1], values[2]], basis))
}

/// Determinant of a square matrix in row-major order, computed by `faer`.
///
/// Used to cross-check closed-form determinants of structured matrices.
pub fn determinant(data: &[f64], n: usize) -> f64 {
    let m: Mat<f64> = Mat::from_fn(n, n, |i, j| data[i * n + j]);
    m.as_ref().determinant()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_conversion_round_trips() {
        let m = DMat3::from_cols_array(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        let rows = dmat3_to_rows(m);
        // Column 0 of m is (1, 2, 3), so row 1 starts with 2.
        assert_eq!(rows[3], 2.0);
        assert_eq!(rows_to_dmat3(&rows), m);
    }
}
