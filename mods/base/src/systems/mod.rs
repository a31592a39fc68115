//! The base game systems and the table helpers they share.

pub mod economy;
pub mod politics;
pub mod population;
pub mod territory;
pub mod time;

use engine_message::Event;
use engine_state::{CalendarDate, ColumnData, ColumnKind, GameState, Table, TableError, Value};

pub use economy::EconomySystem;
pub use politics::PoliticsSystem;
pub use population::PopulationSystem;
pub use territory::TerritorySystem;
pub use time::TimeSystem;

/// Dates of the `NewDay` events emitted so far this tick.
pub(crate) fn new_days(state: &GameState) -> Vec<CalendarDate> {
    state
        .events_of(|event| match event {
            Event::NewDay { day, month, year } => Some(CalendarDate {
                year: *year,
                month: *month,
                day: *day,
                hour: 0,
                minute: 0,
            }),
            _ => None,
        })
        .collect()
}

/// A computed quantity stored into a column of `kind`. Integer columns
/// take the nearest integer.
pub(crate) fn fit(kind: ColumnKind, x: f64) -> Value {
    match kind {
        ColumnKind::Int => Value::Int(x.round() as i64),
        _ => Value::Float(x),
    }
}

/// Widen an integer column to floats so fractional values can be stored.
/// Other columns, and missing ones, are left as they are.
pub(crate) fn float_column(table: &Table, name: &str) -> Result<Table, TableError> {
    match table.column(name) {
        Some(ColumnData::Int(values)) => table.with_column(
            name,
            ColumnData::Float(values.iter().map(|v| v.map(|x| x as f64)).collect()),
        ),
        _ => Ok(table.clone()),
    }
}
