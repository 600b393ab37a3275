//! # meshless-contact
//!
//! Everything the frame loop does to a deformable body besides the
//! shape-matching step itself:
//!
//! 1. **Containment**: Clamp particles into an axis-aligned box
//! 2. **Picking**: Select a particle with a ray from the pointer
//! 3. **Attraction**: Pull a held body toward the pointer
//! 4. **Impulses**: Kick the whole body with a velocity change

pub mod attraction;
pub mod containment;
pub mod impulse;
pub mod picking;

pub use attraction::PointerAttraction;
pub use containment::{ContactResult, ContainmentBox};
pub use impulse::RandomImpulse;
pub use picking::{pick_particle, ray_sphere_intersect, Pick, Ray};
