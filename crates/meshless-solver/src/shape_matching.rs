//! Shape-matching solver.
//!
//! Each step integrates the external force, fits the best linear, rigid and
//! quadratic transforms from the rest shape to the provisional particle
//! positions, blends them into a goal operator, and pulls every particle
//! toward its goal position.

use std::time::Instant;

use meshless_math::decomposition::{
    normalize_volume3, normalize_volume9, polar_decomposition, signed_root,
};
use meshless_math::{outer, DMat3, DVec3, Mat3x9, PolarMethod, Vec3};
use meshless_mesh::{DuplicateMap, PointCloud, VertexBuffer};
use meshless_types::{MeshlessError, MeshlessResult, ParticleId};

use crate::config::{clamp_unit, DeformationMode, SolverConfig};
use crate::rest_shape::RestShape;
use crate::state::ParticleState;
use crate::step::StepResult;

/// Transforms fitted in one step.
struct Fit {
    linear: DMat3,
    rotation: DMat3,
    polar_method: PolarMethod,
    quadratic: Mat3x9,
    quadratic_raw_determinant: f64,
}

/// Meshless deformable body driven by shape matching.
///
/// Owns all particle buffers. Their lengths are fixed at construction.
pub struct ShapeMatchingSolver {
    config: SolverConfig,
    rest: RestShape,
    state: ParticleState,
    duplicates: DuplicateMap,
    deformation: DeformationMode,
    linear: DMat3,
    rotation: DMat3,
    quadratic: Mat3x9,
}

impl ShapeMatchingSolver {
    /// Builds a solver from a position-only vertex stream.
    ///
    /// Coincident vertices are merged into a single particle; the returned
    /// solver remembers which slots each particle came from.
    pub fn from_vertex_buffer(buffer: &VertexBuffer, config: SolverConfig) -> MeshlessResult<Self> {
        let cloud = PointCloud::from_vertex_buffer(buffer)?;
        Self::from_point_cloud(cloud, config)
    }

    /// Builds a solver from an already deduplicated cloud.
    pub fn from_point_cloud(cloud: PointCloud, config: SolverConfig) -> MeshlessResult<Self> {
        config.validate()?;
        let config = config.normalized();

        let (positions, duplicates) = cloud.into_parts();
        let rest = RestShape::new(positions, config.require_full_rank)?;

        if rest.linear_rank() < 3 {
            tracing::warn!(
                particles = rest.len(),
                linear_rank = rest.linear_rank(),
                "rest shape is collinear or coplanar, rotations will use the eigen polar path"
            );
        }

        let deformation = match config.deformation {
            DeformationMode::Quadratic if !rest.supports_quadratic() => {
                tracing::warn!(
                    particles = rest.len(),
                    quadratic_rank = rest.quadratic_rank(),
                    "rest shape cannot support the quadratic model, using linear deformation"
                );
                DeformationMode::Linear
            }
            mode => mode,
        };

        tracing::debug!(
            particles = rest.len(),
            vertices = duplicates.vertex_count(),
            alpha = config.alpha,
            beta = config.beta,
            mode = ?deformation,
            "shape matching solver created"
        );

        let state = ParticleState::at_rest(&rest);
        Ok(Self {
            config,
            rest,
            state,
            duplicates,
            deformation,
            linear: DMat3::IDENTITY,
            rotation: DMat3::IDENTITY,
            quadratic: Mat3x9::from_mat3(DMat3::IDENTITY),
        })
    }

    /// Advances the body by `dt` under a uniform external `force`.
    pub fn update(&mut self, dt: f32, force: Vec3) -> MeshlessResult<StepResult> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(MeshlessError::InvalidTimestep(dt));
        }
        let start = Instant::now();

        self.state.integrate(dt, force);
        self.state.update_center_of_mass();

        let Some(fit) = self.fit() else {
            tracing::warn!(dt, "particle state is not finite, skipping shape matching correction");
            return Ok(StepResult {
                linear_determinant: f64::NAN,
                quadratic_determinant: f64::NAN,
                polar_method: None,
                center_of_mass: self.state.center_of_mass,
                corrected: false,
                wall_time: start.elapsed().as_secs_f64(),
            });
        };

        self.linear = fit.linear;
        self.rotation = fit.rotation;
        self.quadratic = fit.quadratic;

        let beta = f64::from(self.config.beta);
        let goal = fit.quadratic * beta + Mat3x9::from_mat3(fit.rotation) * (1.0 - beta);

        let corrected = goal.is_finite();
        if corrected {
            let alpha_term = f64::from(self.alpha_term(dt));
            let com = self.state.center_of_mass.as_dvec3();
            let gain = alpha_term / f64::from(dt);
            let state = &mut self.state;
            for (i, b) in self.rest.basis().iter().enumerate() {
                let target = goal.mul_vec9(b) + com;
                let pull = (target - state.positions[i].as_dvec3()) * gain;
                state.velocities[i] += pull.as_vec3();
                state.positions[i] = state.previous[i] + state.velocities[i] * dt;
            }
        } else {
            tracing::warn!(dt, "goal operator is not finite, skipping shape matching correction");
        }

        Ok(StepResult {
            linear_determinant: fit.linear.determinant(),
            quadratic_determinant: normalized_determinant(fit.quadratic_raw_determinant),
            polar_method: Some(fit.polar_method),
            center_of_mass: self.state.center_of_mass,
            corrected,
            wall_time: start.elapsed().as_secs_f64(),
        })
    }

    /// Fits the linear, rigid and quadratic transforms from the rest shape
    /// to the current relative positions.
    ///
    /// Returns `None` if the accumulated correlation is not finite.
    fn fit(&self) -> Option<Fit> {
        let mut apq = DMat3::ZERO;
        let mut apq_tilde = Mat3x9::ZERO;
        for (p, b) in self.state.relative.iter().zip(self.rest.basis()) {
            let p = p.as_dvec3();
            apq += outer(p, DVec3::new(b[0], b[1], b[2]));
            apq_tilde.add_outer(p, b);
        }
        if !(apq.is_finite() && apq_tilde.is_finite()) {
            return None;
        }

        let (linear, _) = normalize_volume3(apq * self.rest.aqq_inv());
        let polar = polar_decomposition(apq, self.config.sqrt_iterations);

        // The linear model reuses A in the left block of the 3×9 operator.
        let (quadratic, quadratic_raw_determinant) = match self.deformation {
            DeformationMode::Quadratic => {
                normalize_volume9(apq_tilde.mul_mat9(self.rest.aqq_tilde_inv()))
            }
            DeformationMode::Linear => normalize_volume9(Mat3x9::from_mat3(linear)),
        };

        Some(Fit {
            linear,
            rotation: polar.rotation,
            polar_method: polar.method,
            quadratic,
            quadratic_raw_determinant,
        })
    }

    /// Stiffness actually applied this step.
    fn alpha_term(&self, dt: f32) -> f32 {
        match self.config.slow_motion_reference_dt {
            Some(reference) => self.config.alpha * dt / reference,
            None => self.config.alpha,
        }
    }

    /// Restores the rest configuration. Buffers are reused in place.
    pub fn reset(&mut self) {
        self.state.reset(&self.rest);
        self.linear = DMat3::IDENTITY;
        self.rotation = DMat3::IDENTITY;
        self.quadratic = Mat3x9::from_mat3(DMat3::IDENTITY);
    }

    /// Copies every particle position into all of its vertex slots.
    pub fn sync_to(&self, target: &mut VertexBuffer) -> MeshlessResult<()> {
        self.duplicates.scatter(&self.state.positions, target)
    }

    // ─── Accessors ───────────────────────────────────────────

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.state.positions
    }

    /// Live positions. The slice length cannot change.
    #[inline]
    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.state.positions
    }

    #[inline]
    pub fn velocities(&self) -> &[Vec3] {
        &self.state.velocities
    }

    /// Live velocities. The slice length cannot change.
    #[inline]
    pub fn velocities_mut(&mut self) -> &mut [Vec3] {
        &mut self.state.velocities
    }

    /// Live positions and velocities together, for collaborators that
    /// adjust both (e.g. containment).
    #[inline]
    pub fn particles_mut(&mut self) -> (&mut [Vec3], &mut [Vec3]) {
        (&mut self.state.positions, &mut self.state.velocities)
    }

    /// Center of mass as of the last update (or the rest COM after reset).
    #[inline]
    pub fn center_of_mass(&self) -> Vec3 {
        self.state.center_of_mass
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.state.len()
    }

    /// Position and velocity of one particle.
    pub fn particle(&self, id: ParticleId) -> MeshlessResult<(Vec3, Vec3)> {
        let i = id.index();
        match (self.state.positions.get(i), self.state.velocities.get(i)) {
            (Some(&p), Some(&v)) => Ok((p, v)),
            _ => Err(MeshlessError::ParticleOutOfBounds {
                index: i,
                count: self.particle_count(),
            }),
        }
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.config.alpha
    }

    /// Sets the stiffness, clamped to [0, 1].
    pub fn set_alpha(&mut self, alpha: f32) {
        self.config.alpha = clamp_unit(alpha, self.config.alpha);
    }

    #[inline]
    pub fn beta(&self) -> f32 {
        self.config.beta
    }

    /// Sets the rigid/deformable blend, clamped to [0, 1].
    pub fn set_beta(&mut self, beta: f32) {
        self.config.beta = clamp_unit(beta, self.config.beta);
    }

    #[inline]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    #[inline]
    pub fn rest_shape(&self) -> &RestShape {
        &self.rest
    }

    #[inline]
    pub fn duplicates(&self) -> &DuplicateMap {
        &self.duplicates
    }

    /// The deformation model in effect (may differ from the configured one
    /// if the rest shape could not support the quadratic model).
    #[inline]
    pub fn deformation_mode(&self) -> DeformationMode {
        self.deformation
    }

    /// Total kinetic energy (unit masses).
    pub fn kinetic_energy(&self) -> f64 {
        self.state.kinetic_energy()
    }

    /// Adds the same velocity change to every particle.
    pub fn apply_impulse(&mut self, delta_v: Vec3) {
        self.state.apply_impulse(delta_v);
    }

    /// Volume-normalized linear transform from the last update.
    #[inline]
    pub fn linear_deformation(&self) -> DMat3 {
        self.linear
    }

    /// Rotation from the last update.
    #[inline]
    pub fn rotation(&self) -> DMat3 {
        self.rotation
    }

    /// Volume-normalized quadratic transform from the last update.
    #[inline]
    pub fn quadratic_deformation(&self) -> Mat3x9 {
        self.quadratic
    }
}

/// Determinant of the embedded operator after it was scaled by
/// `1 / signed_root(det, 9)`.
fn normalized_determinant(raw: f64) -> f64 {
    let root = signed_root(raw, 9.0);
    raw / root.powi(9)
}

impl std::fmt::Debug for ShapeMatchingSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeMatchingSolver")
            .field("particles", &self.particle_count())
            .field("deformation", &self.deformation)
            .field("alpha", &self.config.alpha)
            .field("beta", &self.config.beta)
            .finish()
    }
}
