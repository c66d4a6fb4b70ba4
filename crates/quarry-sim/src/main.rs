//! Headless Quarry runner.
//!
//! Lays out a seeded demo world, runs it for a fixed number of ticks and
//! reports the global counters. Set `RUST_LOG=debug` (or `trace`) to follow
//! individual harvesters.

mod director;
mod scenario;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use quarry_core::config::SimulationConfig;
use quarry_core::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::director::Director;
use crate::scenario::Layout;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless Quarry harvester simulation", long_about = None)]
struct Args {
    /// JSON configuration file (defaults apply to anything left out)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 3_600)]
    ticks: u64,

    /// Layout seed
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Harvesters to spawn
    #[arg(long, default_value_t = 6)]
    harvesters: usize,

    /// Deposits to scatter
    #[arg(long, default_value_t = 8)]
    deposits: usize,

    /// Hostiles on the rim
    #[arg(long, default_value_t = 2)]
    hostiles: usize,

    /// Chance that a deposit is tainted
    #[arg(long, default_value_t = 0.3)]
    tainted_ratio: f64,

    /// Half-width of the play area
    #[arg(long, default_value_t = 30.0)]
    extent: f32,

    /// Ticks between hostile blows
    #[arg(long, default_value_t = 60)]
    strike_interval: u64,

    /// Ticks between progress reports
    #[arg(long, default_value_t = 600)]
    report_every: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    let mut sim = Simulation::new(config)?;
    let layout = Layout {
        seed: args.seed,
        harvesters: args.harvesters,
        deposits: args.deposits,
        hostiles: args.hostiles,
        tainted_ratio: args.tainted_ratio.clamp(0.0, 1.0),
        extent: args.extent.max(1.0),
    };
    scenario::populate(&mut sim, &layout)?;
    info!(seed = layout.seed, harvesters = layout.harvesters, deposits = layout.deposits, "scenario ready");

    let mut director = Director::new(args.strike_interval);
    let report_every = args.report_every.max(1);
    for _ in 0..args.ticks {
        sim.step()?;
        director.tick(&mut sim)?;

        if sim.tick() % report_every == 0 {
            let counters = sim.world().counters();
            info!(
                tick = sim.tick(),
                miners = counters.miners(),
                minerals = counters.minerals(),
                hostiles = sim.world().hostiles().count(),
                "progress"
            );
        }
    }

    let counters = sim.world().counters();
    info!(
        ticks = sim.tick(),
        miners = counters.miners(),
        minerals = counters.minerals(),
        "run complete"
    );
    Ok(())
}
