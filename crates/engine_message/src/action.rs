//! External commands consumed by systems during a tick.
//!
//! Clients never modify the simulation state directly. They submit
//! [`Action`]s, the host queues them, and the scheduler hands the whole batch
//! to every system on the next tick. Each batch is consumed once and then
//! discarded.

use serde::{Deserialize, Serialize};

/// Originator used for actions issued by the host itself (startup, tools).
pub const SERVER_PLAYER: &str = "server";

/// A command from the outside world, tagged with who issued it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Who initiated the action (`"local_player"`, `"server"`, a player id).
    pub player_id: String,
    /// What is being asked for.
    pub kind: ActionKind,
}

impl Action {
    /// Create a new action issued by `player_id`.
    #[must_use]
    pub fn new(player_id: impl Into<String>, kind: ActionKind) -> Self {
        Self {
            player_id: player_id.into(),
            kind,
        }
    }

    /// Create an action issued by the host.
    #[must_use]
    pub fn server(kind: ActionKind) -> Self {
        Self::new(SERVER_PLAYER, kind)
    }
}

/// The variants a system may recognise.
///
/// Systems match on the variants they understand and ignore the rest, which
/// is how unrelated systems share one action stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    // ── Time & control ──────────────────────────────────────────────────────
    /// Set the simulation speed level (1 = slowest, 5 = fastest).
    SetGameSpeed {
        /// Requested level; out-of-range values are clamped by the time system.
        speed_level: i64,
    },

    /// Pause or resume the advance of the game clock.
    SetPaused {
        /// `true` to pause.
        is_paused: bool,
    },

    // ── Map ─────────────────────────────────────────────────────────────────
    /// Transfer ownership of a region to a country.
    SetRegionOwner {
        /// Target region.
        region_id: i64,
        /// Tag of the new owning country.
        new_owner_tag: String,
    },

    // ── Economy ─────────────────────────────────────────────────────────────
    /// Update the tax rate of a country.
    SetTax {
        /// Target country.
        country_tag: String,
        /// Requested rate; clamped to `[0, 1]` by the economy system.
        new_tax_rate: f64,
    },

    /// A command defined by a mod. `name` should be namespaced like system
    /// ids (`<mod>.<command>`).
    Custom {
        /// Namespaced command name.
        name: String,
        /// Free-form payload.
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl ActionKind {
    /// Short name of the variant, for logging.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::SetGameSpeed { .. } => "set_game_speed",
            Self::SetPaused { .. } => "set_paused",
            Self::SetRegionOwner { .. } => "set_region_owner",
            Self::SetTax { .. } => "set_tax",
            Self::Custom { name, .. } => name,
        }
    }
}
