//! # engine_state
//!
//! The world state the simulation advances, tick by tick.
//!
//! This crate provides:
//!
//! - [`Value`] / [`Key`]: cell values and row identifiers.
//! - [`ColumnData`]: typed, nullable column storage.
//! - [`Table`]: an immutable columnar table keyed by a unique id column.
//! - [`TimeComponent`]: the game clock.
//! - [`GameState`]: the store: named tables, clock, globals, this tick's
//!   events and actions.
//!
//! Tables are values. Every operation returns a new table and
//! [`GameState::update_table`] swaps the stored reference, so a reader holding
//! last tick's table keeps seeing last tick's data.

pub mod column;
pub mod error;
pub mod store;
pub mod table;
pub mod time;
pub mod value;

pub use column::{Column, ColumnData, ColumnKind};
pub use error::{StateError, TableError};
pub use store::GameState;
pub use table::{Row, Table};
pub use time::{CalendarDate, TimeComponent};
pub use value::{Key, Value};
