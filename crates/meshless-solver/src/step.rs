//! Per-step diagnostics.

use meshless_math::{PolarMethod, Vec3};

/// Result of one solver step.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// `det(A)` after volume normalization (≈ 1 unless `A` is singular).
    /// NaN when the particle state was not finite.
    pub linear_determinant: f64,
    /// Determinant of the normalized 9×9 quadratic operator
    /// (≈ 1 unless the embedded block is singular).
    pub quadratic_determinant: f64,
    /// How the rotation was extracted. `None` when the step was skipped.
    pub polar_method: Option<PolarMethod>,
    /// Center of mass after the provisional integration.
    pub center_of_mass: Vec3,
    /// False if the goal operator was not finite and the shape-matching
    /// correction was skipped.
    pub corrected: bool,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
}
