//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.8;

/// Default simulation timestep (seconds). 1/60th of a second.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default stiffness (return rate toward the goal shape).
pub const DEFAULT_ALPHA: f32 = 0.4;

/// Default blend between rigid (0) and deformable (1) goal shapes.
pub const DEFAULT_BETA: f32 = 0.7;

/// Fixed number of Denman–Beavers rounds for the matrix square root.
pub const SQRT_ITERATIONS: u32 = 100;

/// Reference timestep for slow-motion stiffness scaling (seconds).
pub const SLOW_MOTION_REFERENCE_DT: f32 = 0.01;

/// Determinants with a smaller magnitude are treated as zero.
pub const DEGENERATE_DETERMINANT: f64 = 1.0e-12;

/// Relative eigenvalue cutoff for the symmetric pseudo-inverse.
pub const PSEUDO_INVERSE_RCOND: f64 = 1.0e-9;

/// Pick radius around each particle for pointer ray tests (meters).
pub const PICK_RADIUS: f32 = 0.2;

/// Default gain of the pointer attraction force.
pub const ATTRACTION_GAIN: f32 = 5.0;

/// Half extent of the default containment box in X and Z (meters).
pub const CONTAINMENT_HALF_EXTENT: f32 = 20.0;

/// Height of the default containment box (meters).
pub const CONTAINMENT_HEIGHT: f32 = 20.0;
