//! # Hunter Sim
//!
//! Headless arena run of the hunter controller.
//!
//! Usage: `hunter-sim [config.toml]`. Without a path the built-in arena
//! is used. Prints a JSON run summary to stdout and, when `trace_path`
//! is set, writes a per-tick JSON trace.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod arena;
mod config;
mod runner;

use anyhow::{Context, Result};
use config::SimConfig;
use runner::Simulation;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("hunter=info".parse()?))
        .init();

    info!("Hunter sim {}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => {
            SimConfig::load(&path).with_context(|| format!("failed to load config {path}"))?
        },
        None => {
            info!("No config given, using the built-in arena");
            SimConfig::default()
        },
    };

    let mut simulation = Simulation::new(config.clone());
    let summary = simulation.run();

    if let Some(path) = &config.trace_path {
        simulation
            .write_trace(path)
            .with_context(|| format!("failed to write trace {}", path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
