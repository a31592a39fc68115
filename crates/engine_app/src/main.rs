//! # engine_app
//!
//! Host for the simulation. It owns logging, configuration and the tick loop;
//! everything the game does comes from mods.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging and parse the command line.
//! 2. Discover mods under `--mods-dir` and sort them by dependency.
//! 3. Load each mod's `data/*.json` tables.
//! 4. Register the mods' systems and check their execution order.
//! 5. Queue the initial actions and enter the fixed-timestep tick loop.

mod config;
mod data;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use engine_message::{Action, ActionKind};
use engine_mods::{EntryPoints, ModResolver};
use engine_state::GameState;
use engine_system::Engine;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use session::Session;

/// Crates whose `info` logs are shown unless `RUST_LOG` says otherwise.
const LOG_TARGETS: &[&str] = &[
    "engine_app",
    "engine_mods",
    "engine_system",
    "mod_base",
];

/// Mods compiled into this host.
fn entry_points() -> EntryPoints {
    EntryPoints::new().with(mod_base::MOD_ID, mod_base::register)
}

fn main() -> Result<()> {
    let mut filter = EnvFilter::from_default_env();
    for target in LOG_TARGETS {
        filter = filter.add_directive(format!("{target}=info").parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::parse();
    info!(mods_dir = %config.mods_dir.display(), "engine starting");

    let loaded = ModResolver::new(config.mods_dir.clone(), entry_points())
        .resolve()
        .context("failed to resolve mod load order")?;

    let mut state = GameState::new();
    data::load_mod_data(&mut state, &loaded.mods).context("failed to load mod data")?;

    let mut engine = Engine::new();
    engine.register_systems(loaded.systems);
    engine
        .rebuild_execution_order()
        .context("failed to order systems")?;

    let mut session = Session::new(engine, state, config.tick_config());
    if let Some(speed_level) = config.speed {
        session.receive_action(Action::server(ActionKind::SetGameSpeed { speed_level }));
    }
    info!(queued = session.pending_actions(), "initial actions queued");
    session.run()?;

    info!(
        tick = session.state().tick(),
        date = %session.state().time.date_string(),
        "engine shut down"
    );
    Ok(())
}
