//! `base.time`: the game clock.
//!
//! Applies speed and pause actions, converts real seconds into game minutes
//! and announces every hour and midnight crossed. A single tick moves the
//! clock at most [`MAX_DAYS_PER_TICK`] game days; real time beyond that is
//! dropped.

use anyhow::Result;
use engine_message::{ActionKind, Event};
use engine_state::time::{MINUTES_PER_DAY, MINUTES_PER_HOUR};
use engine_state::{CalendarDate, GameState};
use engine_system::System;
use tracing::{debug, warn};

pub const SYSTEM_ID: &str = "base.time";

/// Most game days one tick may advance the clock.
pub const MAX_DAYS_PER_TICK: f64 = 30.0;

/// Real seconds one game day lasts at each speed level.
#[must_use]
pub fn seconds_per_day(speed_level: u8) -> f64 {
    match speed_level {
        2 => 24.0,
        3 => 12.0,
        4 => 2.4,
        5 => 0.6,
        _ => 48.0,
    }
}

#[derive(Debug, Default)]
pub struct TimeSystem;

impl TimeSystem {
    /// Create the system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl System for TimeSystem {
    fn id(&self) -> &str {
        SYSTEM_ID
    }

    fn update(&mut self, state: &mut GameState, dt: f64) -> Result<()> {
        for action in &state.current_actions {
            match &action.kind {
                ActionKind::SetGameSpeed { speed_level } => {
                    state.time.set_speed_level(*speed_level);
                    debug!(speed = state.time.speed_level(), "game speed changed");
                }
                ActionKind::SetPaused { is_paused } => {
                    state.time.set_paused(*is_paused);
                    debug!(paused = is_paused, "pause toggled");
                }
                _ => {}
            }
        }

        if state.time.is_paused() {
            return Ok(());
        }

        let per_day = seconds_per_day(state.time.speed_level());
        let max_dt = MAX_DAYS_PER_TICK * per_day;
        let dt = if dt > max_dt {
            warn!(dt, max_dt, "tick delta too large, clock advance capped");
            max_dt
        } else {
            dt
        };
        let minutes = state.time.accumulate(dt, per_day);
        if minutes == 0 {
            return Ok(());
        }

        let before = state.time.total_minutes();
        state.time.advance_minutes(minutes);
        let after = state.time.total_minutes();

        for hour in (before / MINUTES_PER_HOUR + 1)..=(after / MINUTES_PER_HOUR) {
            let total_minutes = hour * MINUTES_PER_HOUR;
            state.push_event(Event::NewHour {
                hour: (hour % 24) as u32,
                total_minutes,
            });
            if total_minutes % MINUTES_PER_DAY == 0 {
                let date = CalendarDate::from_minutes(total_minutes);
                state.push_event(Event::NewDay {
                    day: date.day,
                    month: date.month,
                    year: date.year,
                });
            }
        }

        debug!(minutes, date = %state.time.date_string(), "clock advanced");
        Ok(())
    }
}
