//! `base.territory`: region ownership.

use anyhow::Result;
use engine_message::{ActionKind, Event};
use engine_state::{GameState, Key, Value};
use engine_system::System;
use tracing::{info, warn};

use crate::{OWNER, REGIONS};

pub const SYSTEM_ID: &str = "base.territory";

/// Applies `SetRegionOwner` actions to `regions.owner`.
#[derive(Debug, Default)]
pub struct TerritorySystem;

impl TerritorySystem {
    /// Create the system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl System for TerritorySystem {
    fn id(&self) -> &str {
        SYSTEM_ID
    }

    fn dependencies(&self) -> Vec<String> {
        vec![super::time::SYSTEM_ID.to_string()]
    }

    fn update(&mut self, state: &mut GameState, _dt: f64) -> Result<()> {
        let transfers: Vec<(i64, String)> = state
            .current_actions
            .iter()
            .filter_map(|action| match &action.kind {
                ActionKind::SetRegionOwner {
                    region_id,
                    new_owner_tag,
                } => Some((*region_id, new_owner_tag.clone())),
                _ => None,
            })
            .collect();

        for (region_id, new_owner) in transfers {
            let regions = state.get_table(REGIONS)?;
            let key = Key::Int(region_id);
            if regions.row_index(&key).is_none() {
                warn!(region_id, "ownership change for unknown region ignored");
                continue;
            }

            let old_owner = regions
                .get(&key, OWNER)
                .and_then(|v| v.as_str().map(str::to_string));
            let updated = regions.set_where_key(&key, OWNER, Value::from(new_owner.as_str()))?;
            state.update_table(REGIONS, updated);

            info!(region_id, owner = %new_owner, "region ownership transferred");
            state.push_event(Event::RegionOwnerChanged {
                region_id,
                old_owner,
                new_owner,
            });
        }
        Ok(())
    }
}
