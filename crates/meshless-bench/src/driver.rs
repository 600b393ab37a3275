//! Frame-loop driver.
//!
//! Owns one deformable body and runs the per-frame sequence:
//!
//! 1. Sum external forces (gravity, plus pointer attraction while held)
//! 2. Clamp into the containment box
//! 3. Shape-matching update with `dt · time_scale`
//! 4. Clamp into the containment box again
//! 5. Scatter particle positions into the vertex buffer
//! 6. Emit telemetry

use std::time::Instant;

use meshless_contact::{ContactResult, PointerAttraction, RandomImpulse, Ray};
use meshless_math::{PolarMethod, Vec3};
use meshless_mesh::VertexBuffer;
use meshless_solver::{ShapeMatchingSolver, SolverConfig, StepResult};
use meshless_telemetry::{EventBus, EventKind, SimulationEvent};
use meshless_types::MeshlessResult;

use crate::config::{clamp_time_scale, DriverConfig};
use crate::scenarios::Scenario;

/// Runs a [`ShapeMatchingSolver`] frame by frame.
pub struct SimulationDriver {
    solver: ShapeMatchingSolver,
    vertices: VertexBuffer,
    config: DriverConfig,
    bus: EventBus,
    attraction: PointerAttraction,
    pointer: Option<Ray>,
    paused: bool,
    step_count: u64,
    sim_time: f64,
}

impl SimulationDriver {
    /// Builds a driver for the body described by `vertices`.
    pub fn new(
        vertices: VertexBuffer,
        solver: SolverConfig,
        config: DriverConfig,
    ) -> MeshlessResult<Self> {
        config.validate()?;
        let config = config.normalized();
        let solver = ShapeMatchingSolver::from_vertex_buffer(&vertices, solver)?;
        let attraction = PointerAttraction::new(config.attraction_gain);

        tracing::info!(
            particles = solver.particle_count(),
            vertices = vertices.vertex_count(),
            dt = config.dt,
            time_scale = config.time_scale,
            "simulation driver ready"
        );

        Ok(Self {
            solver,
            vertices,
            config,
            bus: EventBus::new(),
            attraction,
            pointer: None,
            paused: false,
            step_count: 0,
            sim_time: 0.0,
        })
    }

    /// Builds a driver for a scenario and applies its initial impulse.
    pub fn from_scenario(scenario: &Scenario) -> MeshlessResult<Self> {
        let mut driver = Self::new(
            scenario.vertices.clone(),
            scenario.solver.clone(),
            scenario.driver.clone(),
        )?;
        if let Some(dv) = scenario.initial_impulse {
            driver.apply_impulse(dv);
        }
        Ok(driver)
    }

    /// Advances one frame unless paused. Returns `None` while paused.
    pub fn step(&mut self) -> MeshlessResult<Option<StepResult>> {
        if self.paused {
            return Ok(None);
        }
        self.advance().map(Some)
    }

    /// Advances one frame even while paused (single stepping).
    pub fn step_once(&mut self) -> MeshlessResult<StepResult> {
        self.advance()
    }

    /// Advances `n` frames, returning the results of the frames that ran.
    pub fn run(&mut self, n: u32) -> MeshlessResult<Vec<StepResult>> {
        let mut results = Vec::with_capacity(n as usize);
        for _ in 0..n {
            if let Some(result) = self.step()? {
                results.push(result);
            }
        }
        Ok(results)
    }

    fn advance(&mut self) -> MeshlessResult<StepResult> {
        let frame_start = Instant::now();
        let dt = self.config.scaled_dt();
        let step = self.step_count;
        self.bus.emit(SimulationEvent::new(
            step,
            EventKind::StepBegin {
                sim_time: self.sim_time,
                dt,
            },
        ));

        let force = self.config.gravity + self.attraction_force();

        let before = self.contain();
        let result = self.solver.update(dt, force)?;
        let after = self.contain();
        self.solver.sync_to(&mut self.vertices)?;

        let contact = before.merge(&after);
        if contact.resolved_count > 0 {
            self.bus.emit(SimulationEvent::new(
                step,
                EventKind::Containment {
                    clamped: contact.resolved_count,
                    max_penetration: contact.max_penetration,
                },
            ));
        }
        self.bus.emit(SimulationEvent::new(
            step,
            EventKind::ShapeMatch {
                linear_determinant: result.linear_determinant,
                quadratic_determinant: result.quadratic_determinant,
                eigen_fallback: result.polar_method == Some(PolarMethod::Eigen),
                corrected: result.corrected,
            },
        ));
        self.bus.emit(SimulationEvent::new(
            step,
            EventKind::Energy {
                kinetic: self.solver.kinetic_energy(),
                potential: self.potential_energy(),
            },
        ));
        self.bus.emit(SimulationEvent::new(
            step,
            EventKind::StepEnd {
                wall_time: frame_start.elapsed().as_secs_f64(),
            },
        ));
        self.bus.flush();

        self.step_count += 1;
        self.sim_time += f64::from(dt);
        Ok(result)
    }

    fn contain(&mut self) -> ContactResult {
        match self.config.containment {
            Some(bounds) => bounds.apply(&mut self.solver),
            None => ContactResult::default(),
        }
    }

    fn attraction_force(&self) -> Vec3 {
        match &self.pointer {
            Some(ray) => self.attraction.force(ray, self.solver.center_of_mass()),
            None => Vec3::ZERO,
        }
    }

    /// Gravitational potential energy with unit masses, relative to y = 0.
    pub fn potential_energy(&self) -> f64 {
        let g = f64::from(-self.config.gravity.y);
        self.solver
            .positions()
            .iter()
            .map(|p| g * f64::from(p.y))
            .sum()
    }

    // ─── Pause / Reset / Time Scale ───────────────────────────

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flips the paused flag and returns the new value.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Restores the body to its rest shape and releases the pointer.
    /// Step count and simulation time keep running.
    pub fn reset(&mut self) -> MeshlessResult<()> {
        self.solver.reset();
        self.attraction.release();
        self.pointer = None;
        self.solver.sync_to(&mut self.vertices)?;
        self.bus
            .emit(SimulationEvent::new(self.step_count, EventKind::Reset));
        self.bus.flush();
        Ok(())
    }

    /// Sets the time scale, clamped to [0.1, 1].
    pub fn set_time_scale(&mut self, scale: f32) {
        self.config.time_scale = clamp_time_scale(scale);
    }

    pub fn time_scale(&self) -> f32 {
        self.config.time_scale
    }

    // ─── Interaction ──────────────────────────────────────────

    /// Pointer pressed (or dragged) along `ray`. Grabs the body if the ray
    /// passes through a particle. Returns true while the body is held.
    pub fn pointer_down(&mut self, ray: Ray) -> bool {
        let was_held = self.attraction.held().is_some();
        let held = self.attraction.grab(&ray, self.solver.positions());
        if held {
            if !was_held {
                if let Some(pick) = self.attraction.held() {
                    self.bus.emit(SimulationEvent::new(
                        self.step_count,
                        EventKind::Grab {
                            particle: pick.particle.0,
                            t: pick.t,
                        },
                    ));
                }
            }
            self.pointer = Some(ray);
        }
        held
    }

    /// Pointer released.
    pub fn pointer_up(&mut self) {
        if self.attraction.held().is_some() {
            self.bus
                .emit(SimulationEvent::new(self.step_count, EventKind::Release));
        }
        self.attraction.release();
        self.pointer = None;
    }

    /// Adds `delta_v` to every particle's velocity.
    pub fn apply_impulse(&mut self, delta_v: Vec3) {
        self.solver.apply_impulse(delta_v);
        self.bus.emit(SimulationEvent::new(
            self.step_count,
            EventKind::Impulse {
                delta_v: delta_v.to_array(),
            },
        ));
    }

    /// Applies a random upward kick and returns it.
    pub fn random_impulse(&mut self, source: &mut RandomImpulse) -> Vec3 {
        let dv = source.sample();
        self.apply_impulse(dv);
        dv
    }

    // ─── Accessors ────────────────────────────────────────────

    pub fn solver(&self) -> &ShapeMatchingSolver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut ShapeMatchingSolver {
        &mut self.solver
    }

    /// The vertex stream, in sync with the particles as of the last frame.
    pub fn vertices(&self) -> &VertexBuffer {
        &self.vertices
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Simulated time in seconds (sum of scaled time steps).
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }
}
