//! Rest-shape preprocessing.
//!
//! Everything here depends only on the rest configuration and is computed
//! once, at construction:
//!
//! 1. Rest center of mass (arithmetic mean, unit masses)
//! 2. Rest relative positions `q = x⁰ − c⁰`
//! 3. Quadratic basis `q̃ = [x, y, z, x², y², z², xy, yz, zx]`
//! 4. `Aqq = Σ q qᵀ` and `Aqq̃ = Σ q̃ q̃ᵀ`, with their (pseudo-)inverses

use meshless_math::symmetric::{pseudo_inverse3, pseudo_inverse9};
use meshless_math::{outer, DMat3, DVec3, Mat9, Vec3};
use meshless_types::{MeshlessError, MeshlessResult};

/// Builds the 9-component quadratic basis vector of a relative position.
#[inline]
pub fn quadratic_basis(q: DVec3) -> [f64; 9] {
    [
        q.x,
        q.y,
        q.z,
        q.x * q.x,
        q.y * q.y,
        q.z * q.z,
        q.x * q.y,
        q.y * q.z,
        q.z * q.x,
    ]
}

/// Arithmetic mean of a set of points, accumulated in f64.
pub fn center_of_mass(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    let sum = points.iter().fold(DVec3::ZERO, |acc, p| acc + p.as_dvec3());
    (sum / points.len() as f64).as_vec3()
}

/// Immutable rest configuration of a deformable body.
#[derive(Debug, Clone)]
pub struct RestShape {
    positions: Vec<Vec3>,
    relative: Vec<Vec3>,
    basis: Vec<[f64; 9]>,
    center_of_mass: Vec3,
    aqq: DMat3,
    aqq_inv: DMat3,
    aqq_tilde: Mat9,
    aqq_tilde_inv: Mat9,
    linear_rank: usize,
    quadratic_rank: usize,
}

impl RestShape {
    /// Preprocesses a set of unique rest positions.
    ///
    /// Fails if there are no points, or if the points have no spatial
    /// extent (all coincide). With `require_full_rank`, also fails when
    /// either correlation matrix is singular.
    pub fn new(positions: Vec<Vec3>, require_full_rank: bool) -> MeshlessResult<Self> {
        if positions.is_empty() {
            return Err(MeshlessError::EmptyPointCloud);
        }
        if let Some(index) = positions.iter().position(|p| !p.is_finite()) {
            return Err(MeshlessError::NonFiniteCoordinate { index });
        }

        let center_of_mass = center_of_mass(&positions);
        let relative: Vec<Vec3> = positions.iter().map(|p| *p - center_of_mass).collect();
        let basis: Vec<[f64; 9]> = relative.iter().map(|q| quadratic_basis(q.as_dvec3())).collect();

        let mut aqq = DMat3::ZERO;
        for q in &relative {
            let q = q.as_dvec3();
            aqq += outer(q, q);
        }
        let mut aqq_tilde = Mat9::ZERO;
        for b in &basis {
            aqq_tilde.add_outer(b);
        }

        let linear = pseudo_inverse3(aqq)?;
        let quadratic = pseudo_inverse9(&aqq_tilde)?;

        if linear.rank == 0 {
            return Err(MeshlessError::DegenerateRestShape(format!(
                "{} particle(s) with no spatial extent",
                positions.len()
            )));
        }
        if require_full_rank && (linear.rank < 3 || quadratic.rank < 9) {
            return Err(MeshlessError::DegenerateRestShape(format!(
                "rest correlation is singular (linear rank {}/3, quadratic rank {}/9)",
                linear.rank, quadratic.rank
            )));
        }

        tracing::debug!(
            particles = positions.len(),
            linear_rank = linear.rank,
            quadratic_rank = quadratic.rank,
            "rest shape preprocessed"
        );

        Ok(Self {
            positions,
            relative,
            basis,
            center_of_mass,
            aqq,
            aqq_inv: linear.matrix,
            aqq_tilde,
            aqq_tilde_inv: quadratic.matrix,
            linear_rank: linear.rank,
            quadratic_rank: quadratic.rank,
        })
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false: construction rejects empty clouds.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Rest positions, exactly as supplied at construction.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Rest positions relative to the rest center of mass.
    #[inline]
    pub fn relative(&self) -> &[Vec3] {
        &self.relative
    }

    /// Quadratic basis vector of each particle.
    #[inline]
    pub fn basis(&self) -> &[[f64; 9]] {
        &self.basis
    }

    /// Rest center of mass.
    #[inline]
    pub fn center_of_mass(&self) -> Vec3 {
        self.center_of_mass
    }

    /// `Aqq = Σ q qᵀ`.
    #[inline]
    pub fn aqq(&self) -> DMat3 {
        self.aqq
    }

    /// `Aqq⁻¹` (pseudo-inverse when `linear_rank < 3`).
    #[inline]
    pub fn aqq_inv(&self) -> DMat3 {
        self.aqq_inv
    }

    /// `Aqq̃ = Σ q̃ q̃ᵀ`.
    #[inline]
    pub fn aqq_tilde(&self) -> &Mat9 {
        &self.aqq_tilde
    }

    /// `Aqq̃⁻¹` (pseudo-inverse when `quadratic_rank < 9`).
    #[inline]
    pub fn aqq_tilde_inv(&self) -> &Mat9 {
        &self.aqq_tilde_inv
    }

    /// Numerical rank of `Aqq`.
    #[inline]
    pub fn linear_rank(&self) -> usize {
        self.linear_rank
    }

    /// Numerical rank of `Aqq̃`.
    #[inline]
    pub fn quadratic_rank(&self) -> usize {
        self.quadratic_rank
    }

    /// Returns true if the quadratic model is identifiable.
    #[inline]
    pub fn supports_quadratic(&self) -> bool {
        self.quadratic_rank == 9
    }
}
