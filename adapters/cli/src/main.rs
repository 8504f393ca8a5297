#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Lost & Found session.

mod config;
mod simulation;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{ensure, Result};
use clap::Parser;
use log::{info, warn};
use lost_and_found_core::SessionState;
use lost_and_found_system_session::SessionInput;

use crate::{
    config::{parse_edits, GameConfig},
    simulation::{Simulation, SimulationConfig},
};

/// Runs a Lost & Found session without a display.
#[derive(Debug, Parser)]
#[command(name = "lost-and-found", version)]
struct Args {
    /// TOML configuration file; the embedded default is used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for every random draw of the session.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of fixed ticks to simulate.
    #[arg(long, default_value_t = 3_000)]
    ticks: u32,
    /// Length of one fixed tick in milliseconds.
    #[arg(long, default_value_t = 20)]
    tick_ms: u64,
    /// Tick at which a key press leaves the start screen.
    #[arg(long)]
    start_after: Option<u32>,
    /// Lets the scripted player keep control after the game starts.
    #[arg(long)]
    autopilot: bool,
    /// Difficulty edit applied after loading, as `field=value`.
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    edits: Vec<String>,
    /// Tick at which the `--set` edits are applied to the running session.
    #[arg(long, default_value_t = 0)]
    edit_at: u32,
}

/// Entry point for the Lost & Found command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    ensure!(args.tick_ms > 0, "--tick-ms must be positive");

    let config = GameConfig::load(args.config.as_deref())?;
    let edit = parse_edits(&args.edits)?;

    let catalog = Arc::new(config.build_catalog()?);
    info!(
        "loaded {} searchable and {} trash item kinds",
        catalog.searchable().len(),
        catalog.trash().len()
    );

    let mut simulation = Simulation::new(SimulationConfig {
        catalog,
        difficulty: config.difficulty,
        layout: config.layout,
        initial_health: config.session.initial_health,
        seed: args.seed,
        autopilot: args.autopilot,
    })?;

    let dt = Duration::from_millis(args.tick_ms);
    for tick in 0..args.ticks {
        if tick == args.edit_at && !edit.is_empty() {
            let report = simulation.apply_edit(&edit)?;
            for field in report.applied() {
                info!("difficulty {field} updated at tick {tick}");
            }
            for (field, error) in report.rejected() {
                warn!("difficulty {field} kept its previous value: {error}");
            }
        }
        let inputs: &[SessionInput] = if args.start_after == Some(tick) {
            &[SessionInput::AnyKey]
        } else {
            &[]
        };
        simulation.step(inputs, dt);
        if simulation.state() == SessionState::EndScreen {
            info!("game over after {} ticks", tick + 1);
            break;
        }
    }

    let summary = simulation.summary();
    let tally = summary.tally;
    println!(
        "state: {:?}\nscore: {}\nhealth: {}\nticks: {}\nspawned: {}\ndelivered: {}\nshredded: {}\nlost wanted items: {}\ndanger alerts: {}",
        summary.state,
        summary.score,
        summary.health,
        tally.ticks,
        tally.spawned,
        tally.delivered,
        tally.shredded,
        tally.lost_wants,
        tally.danger_alerts,
    );
    Ok(())
}
