//! Simulation event types.
//!
//! Events are small value types tagged with the step index. They carry
//! just enough to monitor a run or reconstruct what happened in a frame.

use serde::{Deserialize, Serialize};

/// A simulation event emitted by the frame loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Step number (0-indexed).
    pub step: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// Step started.
    StepBegin {
        /// Simulation time at the start of the step (seconds).
        sim_time: f64,
        /// Time step after time scaling (seconds).
        dt: f32,
    },

    /// Step completed.
    StepEnd {
        /// Wall-clock time for the whole frame (seconds).
        wall_time: f64,
    },

    /// Shape-matching fit of this step.
    ShapeMatch {
        /// `det(A)` after volume normalization.
        linear_determinant: f64,
        /// Determinant of the normalized quadratic operator.
        quadratic_determinant: f64,
        /// True if the rotation came from the eigen fallback.
        eigen_fallback: bool,
        /// False if the goal correction was skipped.
        corrected: bool,
    },

    /// Containment pass (before and after the update combined).
    Containment {
        /// Particles clamped into the box.
        clamped: u32,
        /// Largest distance outside the box (meters).
        max_penetration: f32,
    },

    /// Energy snapshot with unit particle masses.
    Energy {
        /// 0.5 · Σ |v|²
        kinetic: f64,
        /// g · Σ y
        potential: f64,
    },

    /// The pointer grabbed a particle.
    Grab {
        particle: u32,
        /// Distance along the pointer ray.
        t: f32,
    },

    /// The pointer let go.
    Release,

    /// A uniform velocity change was applied.
    Impulse { delta_v: [f32; 3] },

    /// The body was reset to its rest configuration.
    Reset,

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given step.
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }

    /// Short name of the payload variant.
    pub fn name(&self) -> &'static str {
        match self.kind {
            EventKind::StepBegin { .. } => "step_begin",
            EventKind::StepEnd { .. } => "step_end",
            EventKind::ShapeMatch { .. } => "shape_match",
            EventKind::Containment { .. } => "containment",
            EventKind::Energy { .. } => "energy",
            EventKind::Grab { .. } => "grab",
            EventKind::Release => "release",
            EventKind::Impulse { .. } => "impulse",
            EventKind::Reset => "reset",
            EventKind::Custom { .. } => "custom",
        }
    }
}
