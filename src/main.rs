//! The `cdt` binary: run one Monte Carlo simulation from a config file.

#![forbid(unsafe_code)]

use anyhow::Context;
use cdt::config::Config;
use cdt::core::universe::{Universe, geometry_filename};
use cdt::observables::{hausdorff, volume_profile};
use cdt::simulation::Simulation;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Sample 2D causal dynamical triangulations.
#[derive(Debug, Parser)]
#[command(name = "cdt", version, about)]
struct Args {
    /// Path to the key-value configuration file.
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let args = Args::parse();
    let config = Config::from_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    info!(?config, "configured run");

    let checkpoint = geometry_filename(
        config.target_volume,
        config.slices,
        config.seed,
        config.sphere,
    );
    let (mut universe, imported) = if config.import_geom && checkpoint.exists() {
        (
            Universe::import_geometry(&checkpoint, config.sphere)?,
            true,
        )
    } else {
        if config.import_geom {
            info!(path = %checkpoint.display(), "no geometry checkpoint found, creating a fresh universe");
        }
        (Universe::create(config.slices, config.sphere)?, false)
    };

    let mut simulation = Simulation::new(config.lambda, config.target_volume, config.seed)?;
    simulation.add_observable(volume_profile(&config.file_id));
    simulation.add_observable(hausdorff(&config.file_id));

    simulation
        .run(&mut universe, config.measurements, imported)
        .context("simulation aborted")?;

    info!(
        sweeps = simulation.sweeps(),
        attempts = simulation.attempts(),
        "run complete"
    );
    Ok(())
}
