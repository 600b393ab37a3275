//! Benchmark scenarios: procedural body + solver and driver settings.
//!
//! 1. **Tetrahedron drop**: Four-particle body falling onto the floor
//! 2. **Sphere drop**: UV-sphere triangle soup raised 5 m, dropped
//! 3. **Cube toss**: Cube thrown upward and sideways with an impulse

use std::fmt;
use std::str::FromStr;

use meshless_math::Vec3;
use meshless_mesh::generators::{cube, tetrahedron, uv_sphere};
use meshless_mesh::VertexBuffer;
use meshless_solver::SolverConfig;
use meshless_types::MeshlessError;
use serde::{Deserialize, Serialize};

use crate::config::DriverConfig;

/// Which scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    TetrahedronDrop,
    SphereDrop,
    CubeToss,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::TetrahedronDrop,
            ScenarioKind::SphereDrop,
            ScenarioKind::CubeToss,
        ]
    }

    /// Returns the snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::TetrahedronDrop => "tetrahedron_drop",
            ScenarioKind::SphereDrop => "sphere_drop",
            ScenarioKind::CubeToss => "cube_toss",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = MeshlessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScenarioKind::all()
            .iter()
            .copied()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
                MeshlessError::InvalidConfig(format!(
                    "unknown scenario '{s}', expected one of: {}",
                    names.join(", ")
                ))
            })
    }
}

/// A fully specified scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    /// Position-only vertex stream of the body, in world space.
    pub vertices: VertexBuffer,
    pub solver: SolverConfig,
    pub driver: DriverConfig,
    /// Number of steps to simulate.
    pub steps: u32,
    /// Velocity change applied once before the first step.
    pub initial_impulse: Option<Vec3>,
}

impl Scenario {
    /// Unit tetrahedron soup dropped from 5 m, 2 seconds at 60 fps.
    pub fn tetrahedron_drop() -> Self {
        let mut vertices = tetrahedron(1.0);
        vertices.translate(Vec3::new(0.0, 5.0, 0.0));
        Self {
            kind: ScenarioKind::TetrahedronDrop,
            vertices,
            solver: SolverConfig::default(),
            driver: DriverConfig::default(),
            steps: 120,
            initial_impulse: None,
        }
    }

    /// UV sphere of radius 1 raised 5 m, 3 seconds.
    pub fn sphere_drop() -> Self {
        let mut vertices = uv_sphere(1.0, 8, 16);
        vertices.translate(Vec3::new(0.0, 5.0, 0.0));
        Self {
            kind: ScenarioKind::SphereDrop,
            vertices,
            solver: SolverConfig::default(),
            driver: DriverConfig::default(),
            steps: 180,
            initial_impulse: None,
        }
    }

    /// Soft cube resting on the floor, kicked up and sideways, 3 seconds.
    pub fn cube_toss() -> Self {
        let mut vertices = cube(1.0);
        vertices.translate(Vec3::new(0.0, 0.5, 0.0));
        Self {
            kind: ScenarioKind::CubeToss,
            vertices,
            solver: SolverConfig::soft(),
            driver: DriverConfig::default(),
            steps: 180,
            initial_impulse: Some(Vec3::new(3.0, 6.0, -2.0)),
        }
    }

    /// Builds the scenario for a kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::TetrahedronDrop => Self::tetrahedron_drop(),
            ScenarioKind::SphereDrop => Self::sphere_drop(),
            ScenarioKind::CubeToss => Self::cube_toss(),
        }
    }
}
