//! Immutable columnar tables keyed by a unique identifier column.
//!
//! Every transformation returns a new [`Table`]; the receiver is left
//! untouched. Construction always re-validates the table invariants:
//!
//! - all columns have the same number of rows,
//! - column names are unique,
//! - the key column exists, holds ints or strings, and every key is non-null
//!   and unique.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::column::{Column, ColumnData, ColumnKind};
use crate::error::TableError;
use crate::value::{Key, Value};

/// Default name of the identifier column.
pub const DEFAULT_KEY_COLUMN: &str = "id";

/// Suffix given to right-hand columns whose name collides in a join.
pub const JOIN_SUFFIX: &str = "_right";

/// A columnar table of entities (regions, countries, ...).
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    /// Name of the identifier column.
    key: String,
    /// Columns in insertion order.
    columns: Vec<Column>,
    /// Row index by key. Rebuilt on construction.
    #[serde(skip)]
    index: HashMap<Key, usize>,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.columns == other.columns
    }
}

impl Table {
    /// Build a table from columns.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if any table invariant is violated.
    pub fn new(key: impl Into<String>, columns: Vec<Column>) -> Result<Self, TableError> {
        let key = key.into();

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
        }

        let key_data = columns
            .iter()
            .find(|c| c.name == key)
            .map(|c| &c.data)
            .ok_or_else(|| TableError::MissingKeyColumn(key.clone()))?;
        if !matches!(key_data.kind(), ColumnKind::Int | ColumnKind::Str) {
            return Err(TableError::InvalidKeyColumn {
                column: key.clone(),
                kind: key_data.kind(),
            });
        }

        let rows = key_data.len();
        for column in &columns {
            if column.data.len() != rows {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected: rows,
                    found: column.data.len(),
                });
            }
        }

        let mut index = HashMap::with_capacity(rows);
        for row in 0..rows {
            let id = key_data.key_at(row).ok_or(TableError::NullKey { row })?;
            if index.insert(id.clone(), row).is_some() {
                return Err(TableError::DuplicateKey(id));
            }
        }

        Ok(Self {
            key,
            columns,
            index,
        })
    }

    /// Build a table from an array of JSON objects.
    ///
    /// Column order follows first appearance across rows. Missing fields are
    /// nulls. Integral numbers become ints, other numbers floats; a column
    /// mixing both becomes a float column. No rows gives an empty table
    /// holding only an int key column.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidRow`] for non-object rows or nested
    /// values, and any construction error.
    pub fn from_json_rows(
        key: impl Into<String>,
        rows: &[serde_json::Value],
    ) -> Result<Self, TableError> {
        let key = key.into();
        if rows.is_empty() {
            let id = Column::new(key.clone(), ColumnData::Int(Vec::new()));
            return Self::new(key, vec![id]);
        }

        let mut names: Vec<String> = Vec::new();
        let mut values: HashMap<String, Vec<Value>> = HashMap::new();

        for (row, record) in rows.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| TableError::InvalidRow {
                row,
                reason: "expected a JSON object".to_string(),
            })?;
            for (name, json) in object {
                let value = json_to_value(json).ok_or_else(|| TableError::InvalidRow {
                    row,
                    reason: format!("field '{name}' holds a nested value"),
                })?;
                let column = values.entry(name.clone()).or_insert_with(|| {
                    names.push(name.clone());
                    vec![Value::Null; row]
                });
                column.push(value);
            }
            for column in values.values_mut() {
                if column.len() < row + 1 {
                    column.push(Value::Null);
                }
            }
        }

        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let raw = values.remove(&name).unwrap_or_default();
            let data = ColumnData::from_values(raw, None).map_err(|e| name_mismatch(e, &name))?;
            columns.push(Column { name, data });
        }
        Self::new(key, columns)
    }

    /// Name of the identifier column.
    #[must_use]
    pub fn key_column(&self) -> &str {
        &self.key
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Column names in table order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Whether a column named `name` exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// The storage of a column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.columns.iter().find(|c| c.name == name).map(|c| &c.data)
    }

    fn require(&self, name: &str) -> Result<&ColumnData, TableError> {
        self.column(name)
            .ok_or_else(|| TableError::ColumnNotFound(name.to_string()))
    }

    fn key_data(&self) -> &ColumnData {
        // The key column is checked to exist on construction.
        self.columns
            .iter()
            .find(|c| c.name == self.key)
            .map(|c| &c.data)
            .unwrap_or(&EMPTY_KEYS)
    }

    /// Row position of `key`.
    #[must_use]
    pub fn row_index(&self, key: &Key) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// The key of the row at `row`.
    #[must_use]
    pub fn key_at(&self, row: usize) -> Option<Key> {
        self.key_data().key_at(row)
    }

    /// Keys in row order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        (0..self.len()).filter_map(|row| self.key_at(row))
    }

    /// Cell lookup by row key. `None` if the row or column does not exist.
    #[must_use]
    pub fn get(&self, key: &Key, column: &str) -> Option<Value> {
        let row = self.row_index(key)?;
        self.column(column).map(|c| c.get(row))
    }

    /// Iterate rows in order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len()).map(|index| Row { table: self, index })
    }

    // -- Transformations --

    /// Projection. The key column is always kept, first.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ColumnNotFound`] for unknown names.
    pub fn select(&self, names: &[&str]) -> Result<Self, TableError> {
        let mut columns = vec![Column {
            name: self.key.clone(),
            data: self.key_data().clone(),
        }];
        for &name in names {
            if name == self.key {
                continue;
            }
            columns.push(Column {
                name: name.to_string(),
                data: self.require(name)?.clone(),
            });
        }
        Self::new(self.key.clone(), columns)
    }

    /// Keep the rows for which `predicate` holds.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&Row<'_>) -> bool) -> Self {
        let rows: Vec<usize> = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.index)
            .collect();
        self.take_rows(&rows)
    }

    fn take_rows(&self, rows: &[usize]) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                data: c.data.take(rows),
            })
            .collect();
        let index = rows
            .iter()
            .enumerate()
            .filter_map(|(new, &old)| self.key_at(old).map(|k| (k, new)))
            .collect();
        Self {
            key: self.key.clone(),
            columns,
            index,
        }
    }

    /// Conditional rewrite: where `id == key` then `value`, else the old value.
    ///
    /// A key with no matching row leaves the table unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ColumnNotFound`] or [`TableError::TypeMismatch`],
    /// or a key error when rewriting the key column would break uniqueness.
    pub fn set_where_key(&self, key: &Key, column: &str, value: Value) -> Result<Self, TableError> {
        let mut data = self.require(column)?.clone();
        if let Some(row) = self.row_index(key) {
            data.set(row, value).map_err(|e| name_mismatch(e, column))?;
        }
        self.with_column(column, data)
    }

    /// Add a column, or replace the one with the same name.
    ///
    /// # Errors
    ///
    /// Returns a [`TableError`] if the column length differs or the table
    /// invariants break.
    pub fn with_column(&self, name: &str, data: ColumnData) -> Result<Self, TableError> {
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.data = data,
            None => columns.push(Column {
                name: name.to_string(),
                data,
            }),
        }
        Self::new(self.key.clone(), columns)
    }

    /// Compute a column from each row. An existing column keeps its kind;
    /// a new one is inferred from the produced values.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::TypeMismatch`] if a produced value does not fit.
    pub fn map_column(&self, name: &str, f: impl Fn(&Row<'_>) -> Value) -> Result<Self, TableError> {
        let values: Vec<Value> = self.rows().map(|row| f(&row)).collect();
        let kind = self.column(name).map(ColumnData::kind);
        let data = ColumnData::from_values(values, kind).map_err(|e| name_mismatch(e, name))?;
        self.with_column(name, data)
    }

    /// Remove columns. Unknown names are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::KeyColumnRequired`] when asked to drop the key.
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self, TableError> {
        if names.contains(&self.key.as_str()) {
            return Err(TableError::KeyColumnRequired(self.key.clone()));
        }
        let columns = self
            .columns
            .iter()
            .filter(|c| !names.contains(&c.name.as_str()))
            .cloned()
            .collect();
        Self::new(self.key.clone(), columns)
    }

    /// Left join: every row of `self` is kept; the non-key columns of `right`
    /// are appended, matched by `self[left_on] == right.key`. Unmatched rows
    /// get nulls. Colliding names get a [`JOIN_SUFFIX`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ColumnNotFound`] if `left_on` does not exist.
    pub fn left_join(&self, right: &Table, left_on: &str) -> Result<Self, TableError> {
        let on = self.require(left_on)?;
        let matches: Vec<Option<usize>> = (0..self.len())
            .map(|row| on.key_at(row).and_then(|k| right.row_index(&k)))
            .collect();

        let mut columns = self.columns.clone();
        for column in right.columns.iter().filter(|c| c.name != right.key) {
            let mut name = column.name.clone();
            while columns.iter().any(|c| c.name == name) {
                name.push_str(JOIN_SUFFIX);
            }
            columns.push(Column {
                name,
                data: column.data.take_optional(&matches),
            });
        }
        Self::new(self.key.clone(), columns)
    }

    // -- Aggregation --

    fn numeric(&self, column: &str) -> Result<&ColumnData, TableError> {
        let data = self.require(column)?;
        match data.kind() {
            ColumnKind::Int | ColumnKind::Float => Ok(data),
            kind => Err(TableError::TypeMismatch {
                column: column.to_string(),
                expected: ColumnKind::Float,
                found: kind.to_string(),
            }),
        }
    }

    /// Sum of the present values of a numeric column.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or non-numeric columns.
    pub fn sum(&self, column: &str) -> Result<f64, TableError> {
        let data = self.numeric(column)?;
        Ok((0..data.len()).filter_map(|row| data.get_f64(row)).sum())
    }

    /// Mean of the present values of a numeric column; `None` if every value
    /// is missing.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown or non-numeric columns.
    pub fn mean(&self, column: &str) -> Result<Option<f64>, TableError> {
        let data = self.numeric(column)?;
        let present: Vec<f64> = (0..data.len()).filter_map(|row| data.get_f64(row)).collect();
        if present.is_empty() {
            return Ok(None);
        }
        Ok(Some(present.iter().sum::<f64>() / present.len() as f64))
    }

    /// Null-safe sums of `column` grouped by the values of `by`. Rows with a
    /// null group are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error for unknown columns or a non-numeric `column`.
    pub fn group_sum(&self, by: &str, column: &str) -> Result<BTreeMap<Key, f64>, TableError> {
        let groups = self.require(by)?;
        let data = self.numeric(column)?;
        let mut sums = BTreeMap::new();
        for row in 0..self.len() {
            let Some(group) = groups.key_at(row) else {
                continue;
            };
            let entry = sums.entry(group).or_insert(0.0);
            if let Some(v) = data.get_f64(row) {
                *entry += v;
            }
        }
        Ok(sums)
    }
}

static EMPTY_KEYS: ColumnData = ColumnData::Int(Vec::new());

fn name_mismatch(err: TableError, column: &str) -> TableError {
    match err {
        TableError::TypeMismatch {
            expected, found, ..
        } => TableError::TypeMismatch {
            column: column.to_string(),
            expected,
            found,
        },
        other => other,
    }
}

fn json_to_value(json: &serde_json::Value) -> Option<Value> {
    use serde_json::Value as Json;
    match json {
        Json::Null => Some(Value::Null),
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Some(Value::Int(i)),
            None => n.as_f64().map(Value::Float),
        },
        Json::String(s) => Some(Value::Str(s.clone())),
        Json::Array(_) | Json::Object(_) => None,
    }
}

/// A borrowed view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl Row<'_> {
    /// Position of the row in its table.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Identifier of the row.
    #[must_use]
    pub fn key(&self) -> Option<Key> {
        self.table.key_at(self.index)
    }

    /// Cell value; [`Value::Null`] for missing cells or unknown columns.
    #[must_use]
    pub fn get(&self, column: &str) -> Value {
        self.table
            .column(column)
            .map_or(Value::Null, |c| c.get(self.index))
    }

    /// Numeric cell value.
    #[must_use]
    pub fn get_f64(&self, column: &str) -> Option<f64> {
        self.table.column(column).and_then(|c| c.get_f64(self.index))
    }

    /// Numeric cell value, or `default` when missing.
    #[must_use]
    pub fn f64_or(&self, column: &str, default: f64) -> f64 {
        self.get_f64(column).unwrap_or(default)
    }
}
