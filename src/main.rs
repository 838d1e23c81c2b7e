use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use log::{info, debug};

use segregation_common::SegregationConfig;
use segregation_engine::Simulation;

/// Command-line arguments for the segregation engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config.toml file
    #[arg(default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of steps from the config
    #[arg(long)]
    steps: Option<u32>,

    /// Override the RNG seed from the config
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize the logger, defaulting to info unless RUST_LOG says otherwise
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting Segregation Engine...");

    // --- Load Configuration ---
    let mut config = SegregationConfig::load(&args.config)?;
    info!("Loaded configuration from {}", args.config.display());
    if let Some(steps) = args.steps {
        config.run.steps = steps;
    }
    if args.seed.is_some() {
        config.run.seed = args.seed;
    }
    let params = config.get_sim_params();
    debug!("Simulation Parameters: {:#?}", params);

    // --- Initialize Simulation ---
    let mut sim = Simulation::new(params).context("Failed to build initial population")?;
    if let Some(initial) = sim.history().last() {
        info!(
            "Initial state: {} agents | satisfaction: {:.2}% | segregation: {:.2}%",
            sim.population().len(),
            initial.satisfaction_rate,
            initial.segregation_index
        );
    }

    // --- Simulation Loop ---
    let steps = sim.params().steps;
    let start_time = Instant::now();
    let (final_step, report) = sim.run(steps).context("Simulation step failed")?;
    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished {} steps (now at step {}) in {:.3} seconds.",
        steps,
        final_step,
        total_duration.as_secs_f64()
    );

    if let Some(report) = report {
        info!(
            "Final step {}: {} unsatisfied, {} moved in the last step. Group sizes: {:?}",
            report.step,
            report.unsatisfied.len(),
            report.relocated_from.len(),
            report.groups.iter().map(Vec::len).collect::<Vec<_>>()
        );
    }

    let history = sim.history();
    for (step, (satisfaction, segregation)) in history.satisfaction.iter().zip(&history.segregation).enumerate() {
        info!("Step {:>4} | satisfaction: {:6.2}% | segregation: {:6.2}%", step, satisfaction, segregation);
    }

    info!("Simulation Complete.");
    Ok(())
}
