use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use kitchen_sim::config::{self, SimulationConfig};
use kitchen_sim::runtime::tracing::setup_tracing;
use kitchen_sim::runtime::Simulation;

/// Ghost-kitchen dispatch simulation.
#[derive(Parser)]
#[command(name = "kitchen", version, about)]
struct Cli {
    /// Path to the simulation config file, ex: ./kitchen.yaml
    #[arg(long = "simulation-config", env = "KITCHEN_SIMULATION_CONFIG_PATH")]
    simulation_config: PathBuf,

    /// Debug logging
    #[arg(long, env = "KITCHEN_SIMULATION_DEBUG")]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_tracing(cli.debug);

    let cfg = SimulationConfig::load(&cli.simulation_config)?;

    let shelves = config::fetch_shelves(&cfg.shelves_path)?;
    config::validate_shelves(&shelves)?;

    let specs = config::fetch_orders(&cfg.orders_path).await?;
    config::validate_orders(&specs, &shelves)?;

    info!(
        orders = specs.len(),
        shelves = shelves.len(),
        "starting simulation"
    );
    let stats = Simulation::start(shelves, specs, &cfg.orders).wait().await?;
    info!(
        delivered = stats.delivered_count(),
        wasted = stats.wasted_count(),
        spoiled = stats.spoiled_count(),
        "simulation finished"
    );
    Ok(())
}
