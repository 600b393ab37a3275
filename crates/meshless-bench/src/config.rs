//! Frame-loop and run configuration.
//!
//! A simulation file is TOML with an optional `scenario` name and
//! `[solver]` / `[driver]` tables. Every field has a default.
//!
//! ```toml
//! scenario = "sphere_drop"
//! steps = 300
//!
//! [solver]
//! alpha = 0.4
//! beta = 0.7
//!
//! [driver]
//! time_scale = 0.5
//! ```

use std::path::Path;

use meshless_contact::ContainmentBox;
use meshless_math::Vec3;
use meshless_solver::SolverConfig;
use meshless_types::constants::{ATTRACTION_GAIN, DEFAULT_DT, GRAVITY};
use meshless_types::{MeshlessError, MeshlessResult};
use serde::{Deserialize, Serialize};

use crate::scenarios::ScenarioKind;

/// Slowest allowed time scale.
pub const MIN_TIME_SCALE: f32 = 0.1;
/// Fastest allowed time scale (real time).
pub const MAX_TIME_SCALE: f32 = 1.0;

/// Per-frame settings of the [`SimulationDriver`](crate::SimulationDriver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Uniform acceleration applied every step.
    pub gravity: Vec3,
    /// Frame time step before time scaling (seconds).
    pub dt: f32,
    /// Multiplier on `dt`, clamped to [0.1, 1].
    pub time_scale: f32,
    /// Gain of the pointer attraction force.
    pub attraction_gain: f32,
    /// Box the body is kept inside. `None` disables containment.
    pub containment: Option<ContainmentBox>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -GRAVITY, 0.0),
            dt: DEFAULT_DT,
            time_scale: MAX_TIME_SCALE,
            attraction_gain: ATTRACTION_GAIN,
            containment: Some(ContainmentBox::default()),
        }
    }
}

impl DriverConfig {
    /// Checks values that cannot be clamped.
    pub fn validate(&self) -> MeshlessResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(MeshlessError::InvalidTimestep(self.dt));
        }
        if !self.gravity.is_finite() {
            return Err(MeshlessError::InvalidConfig("gravity must be finite".into()));
        }
        if !self.attraction_gain.is_finite() {
            return Err(MeshlessError::InvalidConfig(
                "attraction_gain must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Returns a copy with `time_scale` clamped.
    pub fn normalized(&self) -> Self {
        Self {
            time_scale: clamp_time_scale(self.time_scale),
            ..self.clone()
        }
    }

    /// `dt · time_scale`.
    pub fn scaled_dt(&self) -> f32 {
        self.dt * clamp_time_scale(self.time_scale)
    }
}

/// Clamps to [0.1, 1]. NaN maps to real time.
pub fn clamp_time_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        MAX_TIME_SCALE
    } else {
        scale.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE)
    }
}

/// Everything needed to run a simulation from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Scenario providing the body.
    pub scenario: ScenarioKind,
    /// Steps to run. `None` uses the scenario's own count.
    pub steps: Option<u32>,
    /// Seed for random impulses.
    pub seed: u64,
    pub solver: SolverConfig,
    pub driver: DriverConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioKind::TetrahedronDrop,
            steps: None,
            seed: 0,
            solver: SolverConfig::default(),
            driver: DriverConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> MeshlessResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| MeshlessError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> MeshlessResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Serializes to TOML.
    pub fn to_toml_string(&self) -> MeshlessResult<String> {
        toml::to_string_pretty(self).map_err(|e| MeshlessError::Serialization(e.to_string()))
    }

    pub fn validate(&self) -> MeshlessResult<()> {
        self.solver.validate()?;
        self.driver.validate()
    }
}
