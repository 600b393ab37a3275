//! meshless CLI: simulation, benchmarking, and config validation.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "meshless")]
#[command(version, about = "Meshless deformation by shape matching")]
struct Cli {
    /// Log at debug level regardless of RUST_LOG.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a config file.
    Simulate {
        /// Path to simulation config (TOML).
        #[arg(short, long, default_value = "simulation.toml")]
        config: String,

        /// Write every simulation event as JSON lines to this file.
        #[arg(long)]
        events: Option<String>,

        /// Apply one random impulse (seeded from the config) before the first step.
        #[arg(long)]
        kick: bool,
    },

    /// Run the benchmark suite.
    Benchmark {
        /// Which scenario to run (tetrahedron_drop, sphere_drop, cube_toss, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Override the number of steps per scenario.
        #[arg(long)]
        steps: Option<u32>,

        /// Output CSV file path. CSV goes to stdout when omitted.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Validate a simulation config and the body it describes.
    Validate {
        /// Path to simulation config (TOML).
        path: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Simulate {
            config,
            events,
            kick,
        } => commands::simulate(&config, events.as_deref(), kick),
        Commands::Benchmark {
            scenario,
            steps,
            output,
        } => commands::benchmark(&scenario, steps, output.as_deref()),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
