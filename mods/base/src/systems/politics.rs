//! `base.politics`: weekly drift of government stability.
//!
//! Each country has a target stability of
//! `approval × 0.7 + human development × 0.3 − corruption`, clamped to
//! `[0, 100]`. Once a week the current stability moves [`DRIFT`] of the way
//! toward it.

use anyhow::Result;
use engine_state::{ColumnData, ColumnKind, GameState, Value};
use engine_system::System;
use tracing::debug;

use super::{fit, new_days};
use crate::COUNTRIES;

pub const SYSTEM_ID: &str = "base.politics";

pub const STABILITY: &str = "gvt_stability";
pub const APPROVAL: &str = "gvt_approval";
pub const HUMAN_DEV: &str = "human_dev";
pub const CORRUPTION: &str = "gvt_corruption";

/// Fraction of the gap to the target closed per week.
pub const DRIFT: f64 = 0.05;

/// Days between stability updates.
pub const DAYS_PER_WEEK: i64 = 7;

/// Target stability from the raw indicators. Missing indicators count as
/// 50 approval, 50 human development and no corruption.
#[must_use]
pub fn target_stability(approval: Option<f64>, human_dev: Option<f64>, corruption: Option<f64>) -> f64 {
    let raw = approval.unwrap_or(50.0) * 0.7 + human_dev.unwrap_or(50.0) * 0.3
        - corruption.unwrap_or(0.0);
    raw.clamp(0.0, 100.0)
}

#[derive(Debug, Default)]
pub struct PoliticsSystem;

impl PoliticsSystem {
    /// Create the system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl System for PoliticsSystem {
    fn id(&self) -> &str {
        SYSTEM_ID
    }

    fn dependencies(&self) -> Vec<String> {
        vec![super::population::SYSTEM_ID.to_string()]
    }

    fn update(&mut self, state: &mut GameState, _dt: f64) -> Result<()> {
        let weeks = new_days(state)
            .iter()
            .filter(|d| d.days_since_epoch() % DAYS_PER_WEEK == 0)
            .count();
        if weeks == 0 {
            return Ok(());
        }

        let mut countries = state.get_table(COUNTRIES)?.as_ref().clone();
        let kind = countries
            .column(STABILITY)
            .map_or(ColumnKind::Float, ColumnData::kind);
        for _ in 0..weeks {
            countries = countries.map_column(STABILITY, |row| {
                let Some(current) = row.get_f64(STABILITY) else {
                    return Value::Null;
                };
                let target = target_stability(
                    row.get_f64(APPROVAL),
                    row.get_f64(HUMAN_DEV),
                    row.get_f64(CORRUPTION),
                );
                fit(kind, current + (target - current) * DRIFT)
            })?;
        }
        state.update_table(COUNTRIES, countries);

        debug!(weeks, "stability drifted");
        Ok(())
    }
}
