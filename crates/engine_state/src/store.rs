//! The central store for the whole simulation.
//!
//! [`GameState`] owns the named tables, the game clock, free-form globals,
//! and the transient per-tick event and action lists. The scheduler holds it
//! exclusively while a tick runs; renderers, UI and save layers read it only
//! between ticks.

use std::collections::BTreeMap;
use std::sync::Arc;

use engine_message::{Action, Event};
use serde::Serialize;

use crate::error::StateError;
use crate::table::Table;
use crate::time::TimeComponent;
use crate::value::Value;

/// Name of the global holding the tick counter.
pub const TICK_GLOBAL: &str = "tick";

/// The simulation state.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Primary game data, keyed by table name (`"regions"`, `"countries"`).
    tables: BTreeMap<String, Arc<Table>>,
    /// The game clock.
    pub time: TimeComponent,
    /// Global values that do not fit in a table (tick counter, flags).
    pub globals: BTreeMap<String, Value>,
    /// Events emitted so far in the current tick.
    pub events: Vec<Event>,
    /// Actions handed to the current tick.
    pub current_actions: Vec<Action>,
}

/// The deterministic part of the state, as encoded by
/// [`GameState::snapshot_bytes`].
#[derive(Serialize)]
struct Snapshot<'a> {
    tables: BTreeMap<&'a str, &'a Table>,
    time: &'a TimeComponent,
    globals: &'a BTreeMap<String, Value>,
}

impl GameState {
    /// Create an empty state with the tick counter at zero.
    #[must_use]
    pub fn new() -> Self {
        let mut globals = BTreeMap::new();
        globals.insert(TICK_GLOBAL.to_string(), Value::Int(0));
        Self {
            tables: BTreeMap::new(),
            time: TimeComponent::new(),
            globals,
            events: Vec::new(),
            current_actions: Vec::new(),
        }
    }

    // -- Tables --

    /// Retrieve a table.
    ///
    /// The returned handle is a snapshot: later [`GameState::update_table`]
    /// calls do not change what it observes.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::TableNotFound`] if no table has that name.
    pub fn get_table(&self, name: &str) -> Result<Arc<Table>, StateError> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| StateError::TableNotFound(name.to_string()))
    }

    /// Replace a table wholesale (copy-on-write). Also registers new names.
    pub fn update_table(&mut self, name: impl Into<String>, table: impl Into<Arc<Table>>) {
        self.tables.insert(name.into(), table.into());
    }

    /// Register a table during initial loading. Returns the table it
    /// replaced, if any.
    pub fn insert_table(
        &mut self,
        name: impl Into<String>,
        table: impl Into<Arc<Table>>,
    ) -> Option<Arc<Table>> {
        self.tables.insert(name.into(), table.into())
    }

    /// Whether a table named `name` exists.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Registered table names, sorted.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    // -- Globals --

    /// The tick counter.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.globals
            .get(TICK_GLOBAL)
            .and_then(Value::as_i64)
            .map_or(0, |t| t.max(0) as u64)
    }

    /// Increment the tick counter and return the new value.
    pub fn advance_tick(&mut self) -> u64 {
        let next = self.tick() + 1;
        self.globals
            .insert(TICK_GLOBAL.to_string(), Value::Int(next as i64));
        next
    }

    /// Read a global value.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    /// Set a global value, replacing any previous one.
    pub fn set_global(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.globals.insert(name.into(), value.into());
    }

    // -- Events --

    /// Append an event for systems later in this tick.
    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events of this tick picked out by `pick`, in emission order.
    ///
    /// ```rust
    /// use engine_message::Event;
    /// use engine_state::GameState;
    ///
    /// let mut state = GameState::new();
    /// state.push_event(Event::NewDay { day: 2, month: 1, year: 2001 });
    /// let days: Vec<u32> = state
    ///     .events_of(|e| match e {
    ///         Event::NewDay { day, .. } => Some(*day),
    ///         _ => None,
    ///     })
    ///     .collect();
    /// assert_eq!(days, vec![2]);
    /// ```
    pub fn events_of<'a, T>(
        &'a self,
        pick: impl Fn(&'a Event) -> Option<T> + 'a,
    ) -> impl Iterator<Item = T> + 'a {
        self.events.iter().filter_map(pick)
    }

    // -- Snapshots --

    /// Encode tables, clock and globals to MessagePack. Two states that went
    /// through the same ticks produce identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Codec`] if encoding fails.
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, StateError> {
        let snapshot = Snapshot {
            tables: self
                .tables
                .iter()
                .map(|(name, table)| (name.as_str(), table.as_ref()))
                .collect(),
            time: &self.time,
            globals: &self.globals,
        };
        Ok(engine_message::encode(&snapshot)?)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
