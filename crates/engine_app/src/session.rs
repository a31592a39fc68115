//! The host's tick loop.
//!
//! A [`Session`] owns the engine, the state and the queue of actions waiting
//! for the next tick. Each tick drains the whole queue into
//! [`Engine::step`]. A tick with nothing queued and no time to advance is
//! skipped.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine_message::Action;
use engine_state::GameState;
use engine_system::{Engine, TickReport};
use tracing::{debug, info, warn};

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
        }
    }
}

/// The engine, its state and the actions queued for the next tick.
#[derive(Debug)]
pub struct Session {
    engine: Engine,
    state: GameState,
    /// Actions received since the last tick, in arrival order.
    queue: Vec<Action>,
    config: TickConfig,
}

impl Session {
    /// Create a session with an empty action queue.
    #[must_use]
    pub fn new(engine: Engine, state: GameState, config: TickConfig) -> Self {
        Self {
            engine,
            state,
            queue: Vec::new(),
            config,
        }
    }

    /// Read access between ticks.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Queue an action for the next tick.
    pub fn receive_action(&mut self, action: Action) {
        debug!(player = %action.player_id, kind = action.kind.label(), "action queued");
        self.queue.push(action);
    }

    /// Number of actions waiting for the next tick.
    #[must_use]
    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    /// Run one tick with every queued action. Returns `None` when the tick
    /// was skipped because there was nothing to do.
    ///
    /// # Errors
    ///
    /// Returns the scheduler's error when the tick cannot run at all. The
    /// queued actions are dropped in that case.
    pub fn tick(&mut self, dt: f64) -> Result<Option<TickReport>> {
        if self.queue.is_empty() && dt <= 0.0 {
            return Ok(None);
        }
        let actions = std::mem::take(&mut self.queue);
        let report = self
            .engine
            .step(&mut self.state, actions, dt)
            .context("tick failed")?;
        if !report.is_clean() {
            warn!(tick = report.tick, failed = ?report.failed, "systems failed this tick");
        }
        Ok(Some(report))
    }

    /// Run the fixed-timestep loop for the configured number of ticks, or
    /// until an error.
    ///
    /// # Errors
    ///
    /// Stops at the first tick that cannot run.
    pub fn run(&mut self) -> Result<()> {
        let tick_duration = Duration::from_secs_f64(1.0 / self.config.tick_rate);
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            "starting tick loop"
        );

        loop {
            let start = Instant::now();

            self.tick(tick_duration.as_secs_f64())?;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                info!(
                    ticks = tick_count,
                    date = %self.state.time.date_string(),
                    "tick loop complete"
                );
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                std::thread::sleep(tick_duration - elapsed);
            } else {
                warn!(
                    tick = self.state.tick(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(())
    }
}
