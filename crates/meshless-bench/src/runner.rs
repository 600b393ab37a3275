//! Benchmark runner: executes scenarios and collects metrics.

use std::time::Instant;

use meshless_math::PolarMethod;
use meshless_types::MeshlessResult;

use crate::driver::SimulationDriver;
use crate::metrics::{max_pairwise_drift, BenchmarkMetrics};
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Runs a single scenario for its configured number of steps.
    pub fn run(scenario: &Scenario) -> MeshlessResult<BenchmarkMetrics> {
        let mut driver = SimulationDriver::from_scenario(scenario)?;
        let start_com = driver.solver().center_of_mass();

        let mut step_times: Vec<f64> = Vec::with_capacity(scenario.steps as usize);
        let mut eigen_fallback_steps = 0u32;
        let mut uncorrected_steps = 0u32;

        let total_start = Instant::now();
        for _ in 0..scenario.steps {
            let result = driver.step_once()?;
            step_times.push(result.wall_time);
            if result.polar_method == Some(PolarMethod::Eigen) {
                eigen_fallback_steps += 1;
            }
            if !result.corrected {
                uncorrected_steps += 1;
            }
        }
        let total_wall_time = total_start.elapsed().as_secs_f64();

        let solver = driver.solver();
        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = step_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max_step = step_times.iter().copied().fold(0.0, f64::max);

        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            particle_count: solver.particle_count(),
            vertex_count: scenario.vertices.vertex_count(),
            steps: scenario.steps,
            total_wall_time,
            avg_step_time: avg_step,
            min_step_time: if min_step.is_finite() { min_step } else { 0.0 },
            max_step_time: max_step,
            final_kinetic_energy: solver.kinetic_energy(),
            com_drop: start_com.y - solver.center_of_mass().y,
            max_distance_drift: max_pairwise_drift(
                solver.positions(),
                solver.rest_shape().positions(),
            ),
            eigen_fallback_steps,
            uncorrected_steps,
        };

        tracing::info!(
            scenario = %metrics.scenario,
            steps = metrics.steps,
            total_wall_time = metrics.total_wall_time,
            "benchmark finished"
        );
        Ok(metrics)
    }

    /// Runs every scenario. `steps` overrides each scenario's step count.
    pub fn run_all(steps: Option<u32>) -> MeshlessResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| {
                let mut scenario = Scenario::from_kind(kind);
                if let Some(steps) = steps {
                    scenario.steps = steps;
                }
                Self::run(&scenario)
            })
            .collect()
    }
}
