//! Pointer attraction.
//!
//! While the pointer holds the body, a force pulls the body's center of
//! mass toward the point on the current pointer ray at the distance where
//! the body was grabbed.

use meshless_math::Vec3;
use meshless_types::constants::{ATTRACTION_GAIN, PICK_RADIUS};

use crate::picking::{pick_particle, Pick, Ray};

/// Grab-and-drag state for one body.
#[derive(Debug, Clone)]
pub struct PointerAttraction {
    /// Force per unit distance between the target and the COM.
    pub gain: f32,
    /// Particle pick radius.
    pub pick_radius: f32,
    held: Option<Pick>,
}

impl Default for PointerAttraction {
    fn default() -> Self {
        Self::new(ATTRACTION_GAIN)
    }
}

impl PointerAttraction {
    pub fn new(gain: f32) -> Self {
        Self {
            gain,
            pick_radius: PICK_RADIUS,
            held: None,
        }
    }

    /// Tries to grab the body with `ray`. Keeps the existing grab if the
    /// body is already held. Returns true if the body is held afterwards.
    pub fn grab(&mut self, ray: &Ray, positions: &[Vec3]) -> bool {
        if self.held.is_none() {
            self.held = pick_particle(ray, positions, self.pick_radius);
            if let Some(pick) = self.held {
                tracing::debug!(particle = pick.particle.0, t = pick.t, "body grabbed");
            }
        }
        self.held.is_some()
    }

    /// Lets go of the body.
    pub fn release(&mut self) {
        self.held = None;
    }

    /// The current grab, if any.
    pub fn held(&self) -> Option<Pick> {
        self.held
    }

    /// Force toward the pointer: `(target − com) · gain`, or zero when
    /// nothing is held.
    pub fn force(&self, ray: &Ray, center_of_mass: Vec3) -> Vec3 {
        match self.held {
            Some(pick) => (ray.point_at(pick.t) - center_of_mass) * self.gain,
            None => Vec3::ZERO,
        }
    }
}
