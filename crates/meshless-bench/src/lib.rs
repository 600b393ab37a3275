//! # meshless-bench
//!
//! Headless frame loop and benchmark suite for the shape-matching engine.
//!
//! - [`SimulationDriver`] runs one body through the per-frame sequence:
//!   forces, containment, shape-matching update, containment, mesh sync,
//!   telemetry.
//! - [`Scenario`] builds the procedural test cases.
//! - [`BenchmarkRunner`] runs a scenario and reports [`BenchmarkMetrics`],
//!   exportable as CSV.

pub mod config;
pub mod driver;
pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use config::{DriverConfig, SimulationConfig};
pub use driver::SimulationDriver;
pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
