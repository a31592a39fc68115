//! State-layer error types.

use crate::column::ColumnKind;
use crate::value::Key;

/// Errors raised while building or transforming a [`Table`](crate::Table).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{0}' appears more than once")]
    DuplicateColumn(String),

    #[error("column '{column}' has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("key column '{0}' is missing")]
    MissingKeyColumn(String),

    #[error("key column '{column}' must hold int or str values, found {kind}")]
    InvalidKeyColumn { column: String, kind: ColumnKind },

    #[error("row {row} has a null key")]
    NullKey { row: usize },

    #[error("duplicate key {0}")]
    DuplicateKey(Key),

    #[error("column '{column}' expects {expected} values, got {found}")]
    TypeMismatch {
        column: String,
        expected: ColumnKind,
        found: String,
    },

    #[error("the key column '{0}' cannot be dropped")]
    KeyColumnRequired(String),

    #[error("row {row} is invalid: {reason}")]
    InvalidRow { row: usize, reason: String },
}

/// Errors raised by [`GameState`](crate::GameState) lookups.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The requested table was never registered.
    #[error("table '{0}' not found in game state")]
    TableNotFound(String),

    /// Encoding a state snapshot failed.
    #[error(transparent)]
    Codec(#[from] engine_message::CodecError),
}
