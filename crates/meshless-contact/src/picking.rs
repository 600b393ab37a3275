//! Ray picking against particles.
//!
//! The pointer ray is a segment from a near point to a far point
//! (typically the unprojected cursor at the near and far planes). Each
//! particle is treated as a small sphere.

use meshless_math::Vec3;
use meshless_types::ParticleId;

/// A pointer ray, stored as a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub near: Vec3,
    pub far: Vec3,
}

impl Ray {
    pub fn new(near: Vec3, far: Vec3) -> Self {
        Self { near, far }
    }

    /// Unit direction from `near` to `far` (zero for a degenerate ray).
    pub fn direction(&self) -> Vec3 {
        (self.far - self.near).normalize_or_zero()
    }

    /// Distance from `near` to `far`.
    pub fn length(&self) -> f32 {
        self.near.distance(self.far)
    }

    /// The point at distance `t` from `near` along the ray.
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.near + self.direction() * t
    }
}

/// A picked particle and its distance along the ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    pub particle: ParticleId,
    pub t: f32,
}

/// Tests a ray segment against a sphere.
///
/// Returns the distance along the ray of the closest approach to `center`
/// if the segment passes within `radius` of it. Spheres behind `near` are
/// never hit. Beyond `far` the segment end point is used for the distance
/// test.
pub fn ray_sphere_intersect(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let dir = ray.direction();
    let t = (center - ray.near).dot(dir);
    if t <= 0.0 {
        return None;
    }
    let closest = if t >= ray.length() {
        ray.far
    } else {
        ray.near + dir * t
    };
    (center.distance(closest) <= radius).then_some(t)
}

/// Returns the first particle (in particle order) the ray passes through.
pub fn pick_particle(ray: &Ray, positions: &[Vec3], radius: f32) -> Option<Pick> {
    positions.iter().enumerate().find_map(|(i, &p)| {
        ray_sphere_intersect(ray, p, radius).map(|t| Pick {
            particle: ParticleId(i as u32),
            t,
        })
    })
}
