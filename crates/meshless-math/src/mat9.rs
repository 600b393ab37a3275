//! 9×9 matrix for the quadratic rest correlation `Aqq̃`.

use serde::{Deserialize, Serialize};

/// A row-major 9×9 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat9 {
    /// Rows of the matrix.
    pub rows: [[f64; 9]; 9],
}

impl Mat9 {
    /// The zero matrix.
    pub const ZERO: Self = Self {
        rows: [[0.0; 9]; 9],
    };

    /// The identity matrix.
    pub fn identity() -> Self {
        let mut m = Self::ZERO;
        for i in 0..9 {
            m.rows[i][i] = 1.0;
        }
        m
    }

    /// Accumulates `v · vᵀ` into this matrix.
    #[inline]
    pub fn add_outer(&mut self, v: &[f64; 9]) {
        for (r, row) in self.rows.iter_mut().enumerate() {
            for (c, value) in row.iter_mut().enumerate() {
                *value += v[r] * v[c];
            }
        }
    }

    /// Element at row `r`, column `c`.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.rows[r][c]
    }

    /// Matrix product `self · rhs`.
    pub fn mul_mat9(&self, rhs: &Mat9) -> Mat9 {
        let mut out = Mat9::ZERO;
        for r in 0..9 {
            for c in 0..9 {
                let mut sum = 0.0;
                for k in 0..9 {
                    sum += self.rows[r][k] * rhs.rows[k][c];
                }
                out.rows[r][c] = sum;
            }
        }
        out
    }

    /// Largest absolute difference from the identity matrix.
    pub fn max_identity_error(&self) -> f64 {
        let mut err = 0.0f64;
        for r in 0..9 {
            for c in 0..9 {
                let expected = if r == c { 1.0 } else { 0.0 };
                err = err.max((self.rows[r][c] - expected).abs());
            }
        }
        err
    }
}

impl Default for Mat9 {
    fn default() -> Self {
        Self::ZERO
    }
}
