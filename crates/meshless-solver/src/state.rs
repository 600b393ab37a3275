//! Particle state: SoA buffers for all per-particle kinematic data.
//!
//! Every buffer has length N (the particle count) for the lifetime of the
//! solver. Reset and update reuse them in place.

use meshless_math::Vec3;

use crate::rest_shape::{center_of_mass, RestShape};

/// Mutable kinematic state of the particles.
#[derive(Debug, Clone)]
pub struct ParticleState {
    /// Current positions.
    pub positions: Vec<Vec3>,
    /// Current velocities.
    pub velocities: Vec<Vec3>,
    /// Current positions relative to `center_of_mass`.
    pub relative: Vec<Vec3>,
    /// Positions at the start of the current step.
    pub previous: Vec<Vec3>,
    /// Current center of mass.
    pub center_of_mass: Vec3,
}

impl ParticleState {
    /// Creates a state at rest in the rest configuration.
    pub fn at_rest(rest: &RestShape) -> Self {
        let n = rest.len();
        Self {
            positions: rest.positions().to_vec(),
            velocities: vec![Vec3::ZERO; n],
            relative: rest.relative().to_vec(),
            previous: rest.positions().to_vec(),
            center_of_mass: rest.center_of_mass(),
        }
    }

    /// Number of particles.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Restores the rest configuration without reallocating.
    pub fn reset(&mut self, rest: &RestShape) {
        self.velocities.fill(Vec3::ZERO);
        self.positions.copy_from_slice(rest.positions());
        self.previous.copy_from_slice(rest.positions());
        self.relative.copy_from_slice(rest.relative());
        self.center_of_mass = rest.center_of_mass();
    }

    /// Saves positions, then integrates a constant force over `dt`:
    /// `v' = v + f·dt`, `x' = x + ½(v + v')·dt`.
    pub fn integrate(&mut self, dt: f32, force: Vec3) {
        let force_dt = force * dt;
        self.previous.copy_from_slice(&self.positions);
        for (p, v) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            let old_vel = *v;
            *v += force_dt;
            *p += (old_vel + *v) * 0.5 * dt;
        }
    }

    /// Recomputes the center of mass and relative positions.
    pub fn update_center_of_mass(&mut self) {
        self.center_of_mass = center_of_mass(&self.positions);
        let com = self.center_of_mass;
        for (q, p) in self.relative.iter_mut().zip(self.positions.iter()) {
            *q = *p - com;
        }
    }

    /// Total kinetic energy with unit particle masses: 0.5 · Σ ||v_i||².
    pub fn kinetic_energy(&self) -> f64 {
        self.velocities
            .iter()
            .map(|v| 0.5 * v.as_dvec3().length_squared())
            .sum()
    }

    /// Adds the same velocity change to every particle.
    pub fn apply_impulse(&mut self, delta_v: Vec3) {
        for v in &mut self.velocities {
            *v += delta_v;
        }
    }
}
