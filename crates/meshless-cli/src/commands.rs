//! CLI command implementations.

use std::fs::File;
use std::io::BufWriter;

use meshless_bench::{
    BenchmarkMetrics, BenchmarkRunner, Scenario, ScenarioKind, SimulationConfig, SimulationDriver,
};
use meshless_contact::RandomImpulse;
use meshless_telemetry::{JsonLinesSink, TracingSink};

/// Builds the scenario a config file describes, with its solver and
/// driver settings applied.
fn scenario_for(config: &SimulationConfig) -> Scenario {
    let mut scenario = Scenario::from_kind(config.scenario);
    scenario.solver = config.solver.clone();
    scenario.driver = config.driver.clone();
    if let Some(steps) = config.steps {
        scenario.steps = steps;
    }
    scenario
}

/// Run a simulation from a config file.
pub fn simulate(
    config_path: &str,
    events_path: Option<&str>,
    kick: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Meshless Simulation");
    println!("───────────────────");
    println!("Config: {config_path}");

    let config = SimulationConfig::load(config_path)?;
    let scenario = scenario_for(&config);
    let mut driver = SimulationDriver::from_scenario(&scenario)?;

    driver
        .bus_mut()
        .add_sink(Box::new(TracingSink::new(tracing::Level::DEBUG)));
    if let Some(path) = events_path {
        let file = BufWriter::new(File::create(path)?);
        driver.bus_mut().add_sink(Box::new(JsonLinesSink::new(file)));
        println!("Events: {path}");
    }

    if kick {
        let mut impulses = RandomImpulse::seeded(config.seed);
        let dv = driver.random_impulse(&mut impulses);
        println!("Kick:   ({:.3}, {:.3}, {:.3}) m/s", dv.x, dv.y, dv.z);
    }

    println!(
        "Body:   {} ({} particles, {} vertices, {:?} deformation)",
        scenario.kind,
        driver.solver().particle_count(),
        scenario.vertices.vertex_count(),
        driver.solver().deformation_mode(),
    );
    println!("Steps:  {}", scenario.steps);
    println!();

    // One COM sample per simulated second.
    let steps_per_second = (1.0 / driver.config().scaled_dt()).round().max(1.0) as u64;
    let com = driver.solver().center_of_mass();
    println!("{:>8}  {:>10} {:>10} {:>10}", "time", "com_x", "com_y", "com_z");
    println!("{:>8.3}  {:>10.4} {:>10.4} {:>10.4}", 0.0, com.x, com.y, com.z);

    for _ in 0..scenario.steps {
        driver.step_once()?;
        if driver.step_count() % steps_per_second == 0 {
            let com = driver.solver().center_of_mass();
            println!(
                "{:>8.3}  {:>10.4} {:>10.4} {:>10.4}",
                driver.sim_time(),
                com.x,
                com.y,
                com.z
            );
        }
    }
    driver.bus_mut().finalize();

    println!();
    println!("Final KE:  {:.6e}", driver.solver().kinetic_energy());
    println!("Final PE:  {:.6e}", driver.potential_energy());
    Ok(())
}

/// Run the benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    steps: Option<u32>,
    output_path: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Meshless Benchmark Suite");
    eprintln!("════════════════════════");

    let kinds: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        vec![scenario_name.parse()?]
    };

    let mut all_metrics = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let mut scenario = Scenario::from_kind(kind);
        if let Some(steps) = steps {
            scenario.steps = steps;
        }
        eprintln!(
            "Running: {} ({} verts, {} steps)",
            kind,
            scenario.vertices.vertex_count(),
            scenario.steps,
        );

        let metrics =
            BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        eprintln!("  Wall time:     {:.3}s", metrics.total_wall_time);
        eprintln!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
        eprintln!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        eprintln!("  COM drop:      {:.4}m", metrics.com_drop);
        eprintln!("  Shape drift:   {:.6}m", metrics.max_distance_drift);
        all_metrics.push(metrics);
    }

    let csv = BenchmarkMetrics::to_csv(&all_metrics);
    match output_path {
        Some(path) => {
            std::fs::write(path, &csv)?;
            eprintln!("Results written to: {path}");
        }
        None => println!("{csv}"),
    }
    Ok(())
}

/// Validate a simulation config.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Meshless Validator");
    println!("──────────────────");
    println!("Validating config: {path}");

    let config = SimulationConfig::load(path)?;
    let scenario = scenario_for(&config);
    let driver = SimulationDriver::from_scenario(&scenario)?;
    let rest = driver.solver().rest_shape();

    println!("Scenario:        {}", scenario.kind);
    println!("Particles:       {}", rest.len());
    println!("Linear rank:     {}/3", rest.linear_rank());
    println!("Quadratic rank:  {}/9", rest.quadratic_rank());
    println!("Deformation:     {:?}", driver.solver().deformation_mode());
    println!("alpha / beta:    {} / {}", driver.solver().alpha(), driver.solver().beta());
    println!("dt × scale:      {} × {}", driver.config().dt, driver.config().time_scale);
    println!("✅ Config is valid.");
    Ok(())
}
