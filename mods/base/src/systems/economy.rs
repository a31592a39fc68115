//! `base.economy`: tax rates and daily income.
//!
//! Every game day each region yields `gdp × tax rate` of its owner, and the
//! sum is paid into the owner's `treasury`.

use std::collections::BTreeMap;

use anyhow::Result;
use engine_message::{ActionKind, Event};
use engine_state::{GameState, Key, Value};
use engine_system::System;
use tracing::{debug, info, warn};

use super::{float_column, new_days};
use crate::{COUNTRIES, OWNER, REGIONS};

pub const SYSTEM_ID: &str = "base.economy";

pub const TAX: &str = "global_tax_mod";
pub const TREASURY: &str = "treasury";
pub const GDP: &str = "gdp";

const DAILY_INCOME: &str = "daily_income";

#[derive(Debug, Default)]
pub struct EconomySystem;

impl EconomySystem {
    /// Create the system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl System for EconomySystem {
    fn id(&self) -> &str {
        SYSTEM_ID
    }

    fn dependencies(&self) -> Vec<String> {
        vec![super::territory::SYSTEM_ID.to_string()]
    }

    fn update(&mut self, state: &mut GameState, _dt: f64) -> Result<()> {
        apply_tax_changes(state)?;

        let days = new_days(state).len();
        if days > 0 {
            collect_income(state, days)?;
        }
        Ok(())
    }
}

fn apply_tax_changes(state: &mut GameState) -> Result<()> {
    let requests: Vec<(String, f64)> = state
        .current_actions
        .iter()
        .filter_map(|action| match &action.kind {
            ActionKind::SetTax {
                country_tag,
                new_tax_rate,
            } => Some((country_tag.clone(), *new_tax_rate)),
            _ => None,
        })
        .collect();

    for (country_tag, requested) in requests {
        if !requested.is_finite() {
            warn!(country = %country_tag, requested, "non-finite tax rate ignored");
            continue;
        }
        let countries = state.get_table(COUNTRIES)?;
        let key = Key::from(country_tag.as_str());
        if countries.row_index(&key).is_none() {
            warn!(country = %country_tag, "tax change for unknown country ignored");
            continue;
        }

        let tax_rate = requested.clamp(0.0, 1.0);
        let updated = float_column(&countries, TAX)?.set_where_key(&key, TAX, Value::Float(tax_rate))?;
        state.update_table(COUNTRIES, updated);

        info!(country = %country_tag, tax_rate, "tax rate adjusted");
        state.push_event(Event::TaxChanged {
            country_tag,
            tax_rate,
        });
    }
    Ok(())
}

/// Per-owner income for one day.
fn daily_income(state: &GameState) -> Result<BTreeMap<Key, f64>> {
    let regions = state.get_table(REGIONS)?;
    let countries = state.get_table(COUNTRIES)?;
    let joined = regions.left_join(&countries, OWNER)?;
    let yields = joined.map_column(DAILY_INCOME, |row| {
        Value::Float(row.f64_or(GDP, 0.0) * row.f64_or(TAX, 0.0))
    })?;
    Ok(yields.group_sum(OWNER, DAILY_INCOME)?)
}

fn collect_income(state: &mut GameState, days: usize) -> Result<()> {
    let income = daily_income(state)?;
    let countries = float_column(&*state.get_table(COUNTRIES)?, TREASURY)?;
    let paid = countries.map_column(TREASURY, |row| {
        let gain = row
            .key()
            .and_then(|key| income.get(&key).copied())
            .unwrap_or(0.0);
        Value::Float(row.f64_or(TREASURY, 0.0) + gain * days as f64)
    })?;
    state.update_table(COUNTRIES, paid);

    debug!(days, owners = income.len(), "daily income collected");
    Ok(())
}
