//! Solver configuration.
//!
//! Parameters that control the shape-matching response: stiffness,
//! rigid/deformable blend, deformation model, and the square-root
//! iteration budget.

use meshless_types::constants::{
    DEFAULT_ALPHA, DEFAULT_BETA, SLOW_MOTION_REFERENCE_DT, SQRT_ITERATIONS,
};
use meshless_types::{MeshlessError, MeshlessResult};
use serde::{Deserialize, Serialize};

/// Deformation model used for the deformable part of the goal shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeformationMode {
    /// Best-fit linear transform `A` (shear and stretch).
    Linear,
    /// Best-fit quadratic transform `Ã` over the 9-component basis.
    /// Falls back to `Linear` when the rest shape cannot support it.
    #[default]
    Quadratic,
}

/// Configuration for the shape-matching solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// How quickly particles return to the goal shape, in [0, 1].
    /// Lower values are goopier, higher values more rigid.
    pub alpha: f32,

    /// Blend between the rigid goal (0) and the deformed goal (1), in [0, 1].
    pub beta: f32,

    /// Deformation model for the deformed goal.
    pub deformation: DeformationMode,

    /// Denman–Beavers rounds for the polar decomposition.
    pub sqrt_iterations: u32,

    /// When set, stiffness is scaled by `dt / reference` so the response
    /// looks similar under slowed-down time steps. Known to be imperfect.
    pub slow_motion_reference_dt: Option<f32>,

    /// Reject rest shapes whose correlation matrices are singular instead
    /// of falling back to pseudo-inverses and the linear model.
    pub require_full_rank: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            deformation: DeformationMode::Quadratic,
            sqrt_iterations: SQRT_ITERATIONS,
            slow_motion_reference_dt: None,
            require_full_rank: false,
        }
    }
}

impl SolverConfig {
    /// Fully rigid: particles snap to the rotated rest shape.
    pub fn rigid() -> Self {
        Self {
            alpha: 1.0,
            beta: 0.0,
            ..Default::default()
        }
    }

    /// Soft and squishy.
    pub fn soft() -> Self {
        Self {
            alpha: 0.1,
            beta: 0.9,
            ..Default::default()
        }
    }

    /// Default stiffness with the slow-motion correction enabled against a
    /// 10 ms reference step.
    pub fn slow_motion() -> Self {
        Self {
            slow_motion_reference_dt: Some(SLOW_MOTION_REFERENCE_DT),
            ..Default::default()
        }
    }

    /// Checks the values that cannot be normalized.
    ///
    /// `alpha` and `beta` are not checked here; they are clamped.
    pub fn validate(&self) -> MeshlessResult<()> {
        if self.sqrt_iterations == 0 {
            return Err(MeshlessError::InvalidConfig(
                "sqrt_iterations must be at least 1".into(),
            ));
        }
        if let Some(reference) = self.slow_motion_reference_dt {
            if !(reference.is_finite() && reference > 0.0) {
                return Err(MeshlessError::InvalidConfig(format!(
                    "slow_motion_reference_dt must be positive, got {reference}"
                )));
            }
        }
        Ok(())
    }

    /// Returns a copy with `alpha` and `beta` clamped to [0, 1].
    pub fn normalized(&self) -> Self {
        Self {
            alpha: clamp_unit(self.alpha, DEFAULT_ALPHA),
            beta: clamp_unit(self.beta, DEFAULT_BETA),
            ..self.clone()
        }
    }
}

/// Clamps to [0, 1]. NaN is replaced by `fallback`.
pub(crate) fn clamp_unit(value: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(0.0, 1.0)
    }
}
