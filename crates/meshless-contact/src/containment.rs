//! Axis-aligned containment box.
//!
//! Keeps particles inside a box by clamping positions. A particle that is
//! clamped on any axis loses its whole velocity (perfectly inelastic).

use meshless_math::Vec3;
use meshless_solver::ShapeMatchingSolver;
use meshless_types::constants::{CONTAINMENT_HALF_EXTENT, CONTAINMENT_HEIGHT};
use serde::{Deserialize, Serialize};

/// Result of a containment pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactResult {
    /// Number of particles that were clamped.
    pub resolved_count: u32,
    /// Largest distance any particle was outside the box before clamping.
    pub max_penetration: f32,
}

impl ContactResult {
    /// Combines two passes over the same frame.
    pub fn merge(&self, other: &ContactResult) -> ContactResult {
        ContactResult {
            resolved_count: self.resolved_count + other.resolved_count,
            max_penetration: self.max_penetration.max(other.max_penetration),
        }
    }
}

/// Axis-aligned box particles cannot leave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainmentBox {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Default for ContainmentBox {
    /// x, z ∈ [−20, 20], y ∈ [0, 20]: a floor at y = 0 with walls.
    fn default() -> Self {
        Self {
            min: Vec3::new(-CONTAINMENT_HALF_EXTENT, 0.0, -CONTAINMENT_HALF_EXTENT),
            max: Vec3::new(CONTAINMENT_HALF_EXTENT, CONTAINMENT_HEIGHT, CONTAINMENT_HALF_EXTENT),
        }
    }
}

impl ContainmentBox {
    /// Creates a box from two corners. The corners may be given in any order.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Returns true if `p` is inside or on the boundary.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Clamps every particle into the box.
    pub fn resolve(&self, positions: &mut [Vec3], velocities: &mut [Vec3]) -> ContactResult {
        let mut resolved = 0u32;
        let mut max_penetration = 0.0_f32;

        for (p, v) in positions.iter_mut().zip(velocities.iter_mut()) {
            let clamped = p.clamp(self.min, self.max);
            if clamped != *p {
                let depth = (*p - clamped).abs().max_element();
                max_penetration = max_penetration.max(depth);
                *p = clamped;
                *v = Vec3::ZERO;
                resolved += 1;
            }
        }

        ContactResult {
            resolved_count: resolved,
            max_penetration,
        }
    }

    /// Clamps the solver's particles into the box.
    pub fn apply(&self, solver: &mut ShapeMatchingSolver) -> ContactResult {
        let (positions, velocities) = solver.particles_mut();
        self.resolve(positions, velocities)
    }
}
