//! `base.population`: monthly demographic flows between three age brackets.
//!
//! On the first day of each month:
//!
//! - births add `pop_15_64 × GROWTH_RATE` to `pop_14`,
//! - aging moves `AGING_RATE` of each of the two younger brackets up one,
//! - deaths remove `pop_65 × DEATH_RATE` from `pop_65`.
//!
//! All flows are computed from the bracket sizes at the start of the month.

use anyhow::{Result, bail};
use engine_state::{ColumnData, ColumnKind, GameState, Table, Value};
use engine_system::System;
use tracing::debug;

use super::{fit, new_days};
use crate::REGIONS;

pub const SYSTEM_ID: &str = "base.population";

pub const POP_YOUNG: &str = "pop_14";
pub const POP_WORKING: &str = "pop_15_64";
pub const POP_ELDERLY: &str = "pop_65";

pub const GROWTH_RATE: f64 = 0.001;
pub const AGING_RATE: f64 = 0.0005;
pub const DEATH_RATE: f64 = 0.0008;

#[derive(Debug, Default)]
pub struct PopulationSystem;

impl PopulationSystem {
    /// Create the system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl System for PopulationSystem {
    fn id(&self) -> &str {
        SYSTEM_ID
    }

    fn dependencies(&self) -> Vec<String> {
        vec![super::time::SYSTEM_ID.to_string()]
    }

    fn update(&mut self, state: &mut GameState, _dt: f64) -> Result<()> {
        let months = new_days(state).iter().filter(|d| d.day == 1).count();
        if months == 0 {
            return Ok(());
        }

        let mut regions = state.get_table(REGIONS)?.as_ref().clone();
        for column in [POP_YOUNG, POP_WORKING, POP_ELDERLY] {
            if !regions.has_column(column) {
                bail!("table '{REGIONS}' has no '{column}' column");
            }
        }
        for _ in 0..months {
            regions = advance_month(&regions)?;
        }
        state.update_table(REGIONS, regions);

        debug!(months, "population updated");
        Ok(())
    }
}

/// One month of births, aging and deaths. Missing cells stay missing.
fn advance_month(regions: &Table) -> Result<Table> {
    let kind = |name: &str| regions.column(name).map_or(ColumnKind::Float, ColumnData::kind);
    let (young_kind, working_kind, elderly_kind) =
        (kind(POP_YOUNG), kind(POP_WORKING), kind(POP_ELDERLY));

    let mut young = Vec::with_capacity(regions.len());
    let mut working = Vec::with_capacity(regions.len());
    let mut elderly = Vec::with_capacity(regions.len());

    for row in regions.rows() {
        let (y, w, e) = (
            row.get_f64(POP_YOUNG),
            row.get_f64(POP_WORKING),
            row.get_f64(POP_ELDERLY),
        );
        let births = w.unwrap_or(0.0) * GROWTH_RATE;
        let aging_young = y.unwrap_or(0.0) * AGING_RATE;
        let aging_working = w.unwrap_or(0.0) * AGING_RATE;
        let deaths = e.unwrap_or(0.0) * DEATH_RATE;

        young.push(y.map_or(Value::Null, |y| fit(young_kind, y + births - aging_young)));
        working.push(w.map_or(Value::Null, |w| {
            fit(working_kind, w + aging_young - aging_working)
        }));
        elderly.push(e.map_or(Value::Null, |e| fit(elderly_kind, e + aging_working - deaths)));
    }

    Ok(regions
        .with_column(POP_YOUNG, ColumnData::from_values(young, Some(young_kind))?)?
        .with_column(POP_WORKING, ColumnData::from_values(working, Some(working_kind))?)?
        .with_column(POP_ELDERLY, ColumnData::from_values(elderly, Some(elderly_kind))?)?)
}
