//! Benchmark metrics: data collected during a benchmark run.

use meshless_math::Vec3;
use serde::{Deserialize, Serialize};

/// Metrics collected from a scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    /// Unique particles.
    pub particle_count: usize,
    /// Vertices in the source stream (with duplicates).
    pub vertex_count: usize,
    /// Number of steps executed.
    pub steps: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average solver time per step (seconds).
    pub avg_step_time: f64,
    pub min_step_time: f64,
    pub max_step_time: f64,
    /// Kinetic energy after the last step.
    pub final_kinetic_energy: f64,
    /// Initial COM height minus final COM height (meters).
    pub com_drop: f32,
    /// Largest change of any pairwise particle distance from the rest
    /// shape, at the end of the run (meters).
    pub max_distance_drift: f32,
    /// Steps whose rotation came from the eigen fallback.
    pub eigen_fallback_steps: u32,
    /// Steps where the goal correction was skipped.
    pub uncorrected_steps: u32,
}

impl BenchmarkMetrics {
    /// CSV header line.
    pub fn to_csv_header() -> String {
        "scenario,particles,vertices,steps,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,final_ke,com_drop,max_distance_drift,eigen_fallback_steps,uncorrected_steps".to_string()
    }

    /// This run as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.4},{:.6},{},{}",
            self.scenario,
            self.particle_count,
            self.vertex_count,
            self.steps,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.final_kinetic_energy,
            self.com_drop,
            self.max_distance_drift,
            self.eigen_fallback_steps,
            self.uncorrected_steps,
        )
    }

    /// Header plus one row per run.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}

/// Largest absolute change of any pairwise distance between two
/// configurations of the same particles.
pub fn max_pairwise_drift(current: &[Vec3], rest: &[Vec3]) -> f32 {
    let n = current.len().min(rest.len());
    let mut drift = 0.0f32;
    for i in 0..n {
        for j in (i + 1)..n {
            let now = current[i].distance(current[j]);
            let then = rest[i].distance(rest[j]);
            drift = drift.max((now - then).abs());
        }
    }
    drift
}
