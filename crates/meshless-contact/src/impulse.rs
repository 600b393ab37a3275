//! Random impulses.

use meshless_math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Horizontal impulse range (x and z), m/s.
pub const HORIZONTAL_RANGE: (f32, f32) = (-8.0, 8.0);
/// Vertical impulse range (always upward), m/s.
pub const VERTICAL_RANGE: (f32, f32) = (2.0, 8.0);

/// Deterministic source of random velocity kicks.
#[derive(Debug, Clone)]
pub struct RandomImpulse {
    rng: StdRng,
}

impl RandomImpulse {
    /// Creates a generator with a fixed seed, so runs are reproducible.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Samples a velocity change with x, z ∈ [−8, 8] and y ∈ [2, 8].
    pub fn sample(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(HORIZONTAL_RANGE.0..=HORIZONTAL_RANGE.1),
            self.rng.gen_range(VERTICAL_RANGE.0..=VERTICAL_RANGE.1),
            self.rng.gen_range(HORIZONTAL_RANGE.0..=HORIZONTAL_RANGE.1),
        )
    }
}
