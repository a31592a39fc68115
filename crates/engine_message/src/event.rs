//! Internal signals between systems.
//!
//! Events are produced during a tick by any system and are visible to every
//! system scheduled later in the same tick. The scheduler clears them in bulk
//! at the start of the next tick, whether or not anyone read them.

use serde::{Deserialize, Serialize};

/// A system-to-system signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Fired every in-game hour.
    NewHour {
        /// Hour of day, 0–23.
        hour: u32,
        /// Game clock value at the start of this hour.
        total_minutes: i64,
    },

    /// Fired once when the date changes (at 00:00).
    NewDay {
        /// Day of month, 1-based.
        day: u32,
        /// Month, 1-based.
        month: u32,
        /// Calendar year.
        year: i32,
    },

    /// A region changed hands.
    RegionOwnerChanged {
        /// The region.
        region_id: i64,
        /// Previous owner, if the region had one.
        old_owner: Option<String>,
        /// New owner tag.
        new_owner: String,
    },

    /// A country's tax rate was changed.
    TaxChanged {
        /// The country.
        country_tag: String,
        /// The applied (clamped) rate.
        tax_rate: f64,
    },

    /// A signal defined by a mod.
    Custom {
        /// Namespaced signal name.
        name: String,
        /// Free-form payload.
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl Event {
    /// Returns `true` for [`Event::NewDay`].
    #[must_use]
    pub fn is_new_day(&self) -> bool {
        matches!(self, Self::NewDay { .. })
    }
}
