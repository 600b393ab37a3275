//! 3×9 matrix for the quadratic deformation model.
//!
//! Shape matching with quadratic deformation maps the 9-component basis
//! `q̃ = [x, y, z, x², y², z², xy, yz, zx]` of each rest particle to a
//! 3D goal offset. The operators `Apq̃`, `Ã` and `R̃` are all 3×9.

use glam::{DMat3, DVec3};
use serde::{Deserialize, Serialize};

use crate::mat9::Mat9;

/// A 3×9 column-major matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat3x9 {
    /// The nine columns (3 components each).
    pub cols: [DVec3; 9],
}

impl Mat3x9 {
    /// The zero matrix.
    pub const ZERO: Self = Self {
        cols: [DVec3::ZERO; 9],
    };

    /// Embeds a 3×3 matrix as `[m | 0 | 0]`.
    pub fn from_mat3(m: DMat3) -> Self {
        let mut out = Self::ZERO;
        out.cols[0] = m.x_axis;
        out.cols[1] = m.y_axis;
        out.cols[2] = m.z_axis;
        out
    }

    /// The left 3×3 block (linear part).
    #[inline]
    pub fn left_block(&self) -> DMat3 {
        DMat3::from_cols(self.cols[0], self.cols[1], self.cols[2])
    }

    /// Accumulates `p · q̃ᵀ`.
    #[inline]
    pub fn add_outer(&mut self, p: DVec3, basis: &[f64; 9]) {
        for (col, &b) in self.cols.iter_mut().zip(basis.iter()) {
            *col += p * b;
        }
    }

    /// Matrix–vector product with a 9-component basis vector.
    #[inline]
    pub fn mul_vec9(&self, basis: &[f64; 9]) -> DVec3 {
        let mut out = DVec3::ZERO;
        for (col, &b) in self.cols.iter().zip(basis.iter()) {
            out += *col * b;
        }
        out
    }

    /// Matrix product with a 9×9 matrix.
    pub fn mul_mat9(&self, m: &Mat9) -> Self {
        let mut out = Self::ZERO;
        for (j, col) in out.cols.iter_mut().enumerate() {
            for k in 0..9 {
                *col += self.cols[k] * m.rows[k][j];
            }
        }
        out
    }

    /// Determinant of the 9×9 matrix formed by placing this block in the
    /// top three rows of the identity.
    ///
    /// The embedding is block upper-triangular with an identity lower-right
    /// block, so its determinant is the determinant of the left 3×3 block.
    #[inline]
    pub fn embedded_determinant(&self) -> f64 {
        self.left_block().determinant()
    }

    /// Element at row `r`, column `c`.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.cols[c][r]
    }

    /// Returns true if every element is finite.
    pub fn is_finite(&self) -> bool {
        self.cols.iter().all(|c| c.is_finite())
    }
}

impl Default for Mat3x9 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::ops::Add for Mat3x9 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut out = self;
        for (c, r) in out.cols.iter_mut().zip(rhs.cols.iter()) {
            *c += *r;
        }
        out
    }
}

impl std::ops::Mul<f64> for Mat3x9 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        let mut out = self;
        for c in out.cols.iter_mut() {
            *c *= rhs;
        }
        out
    }
}
