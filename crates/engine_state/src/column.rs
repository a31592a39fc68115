//! Typed, nullable column storage.
//!
//! A [`Column`] stores the values of one table field for every row, laid out
//! contiguously by type. Missing values are `None` and are skipped by the
//! aggregation helpers on [`Table`](crate::Table).

use std::fmt;

use serde::Serialize;

use crate::error::TableError;
use crate::value::{Key, Value};

/// The element type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Int,
    Float,
    Str,
    Bool,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// Values of a single column, one slot per row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Str(Vec<Option<String>>),
    Bool(Vec<Option<bool>>),
}

impl ColumnData {
    /// A column of `len` missing values.
    #[must_use]
    pub fn nulls(kind: ColumnKind, len: usize) -> Self {
        match kind {
            ColumnKind::Int => Self::Int(vec![None; len]),
            ColumnKind::Float => Self::Float(vec![None; len]),
            ColumnKind::Str => Self::Str(vec![None; len]),
            ColumnKind::Bool => Self::Bool(vec![None; len]),
        }
    }

    /// Build a column from loosely typed values.
    ///
    /// With a `kind` the values are coerced into it (ints widen to floats).
    /// Without one the kind is inferred from the non-null values; a mix of
    /// ints and floats becomes a float column and an all-null input becomes a
    /// float column.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::TypeMismatch`] (with an empty column name, the
    /// caller fills it in) if a value does not fit the column kind.
    pub fn from_values(values: Vec<Value>, kind: Option<ColumnKind>) -> Result<Self, TableError> {
        let kind = match kind {
            Some(kind) => kind,
            None => infer_kind(&values)?,
        };
        let mut data = Self::nulls(kind, values.len());
        for (row, value) in values.into_iter().enumerate() {
            data.set(row, value)?;
        }
        Ok(data)
    }

    /// The element type of this column.
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Int(_) => ColumnKind::Int,
            Self::Float(_) => ColumnKind::Float,
            Self::Str(_) => ColumnKind::Str,
            Self::Bool(_) => ColumnKind::Bool,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Str(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The value at `row`, or [`Value::Null`] if the row is missing or empty.
    #[must_use]
    pub fn get(&self, row: usize) -> Value {
        match self {
            Self::Int(v) => v.get(row).copied().flatten().into(),
            Self::Float(v) => v.get(row).copied().flatten().into(),
            Self::Str(v) => v.get(row).cloned().flatten().into(),
            Self::Bool(v) => v.get(row).copied().flatten().into(),
        }
    }

    /// Numeric view of the value at `row`.
    #[must_use]
    pub fn get_f64(&self, row: usize) -> Option<f64> {
        match self {
            Self::Int(v) => v.get(row).copied().flatten().map(|x| x as f64),
            Self::Float(v) => v.get(row).copied().flatten(),
            _ => None,
        }
    }

    /// The row identifier stored at `row`, if this is an int or str column.
    #[must_use]
    pub fn key_at(&self, row: usize) -> Option<Key> {
        match self {
            Self::Int(v) => v.get(row).copied().flatten().map(Key::Int),
            Self::Str(v) => v.get(row).cloned().flatten().map(Key::Str),
            _ => None,
        }
    }

    /// Overwrite the slot at `row`.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::TypeMismatch`] if `value` does not fit this
    /// column's kind.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn set(&mut self, row: usize, value: Value) -> Result<(), TableError> {
        let kind = self.kind();
        let mismatch = |value: &Value| TableError::TypeMismatch {
            column: String::new(),
            expected: kind,
            found: value.type_name().to_string(),
        };
        match (self, value) {
            (Self::Int(v), Value::Null) => v[row] = None,
            (Self::Float(v), Value::Null) => v[row] = None,
            (Self::Str(v), Value::Null) => v[row] = None,
            (Self::Bool(v), Value::Null) => v[row] = None,
            (Self::Int(v), Value::Int(x)) => v[row] = Some(x),
            (Self::Float(v), Value::Float(x)) => v[row] = Some(x),
            (Self::Float(v), Value::Int(x)) => v[row] = Some(x as f64),
            (Self::Str(v), Value::Str(x)) => v[row] = Some(x),
            (Self::Bool(v), Value::Bool(x)) => v[row] = Some(x),
            (_, other) => return Err(mismatch(&other)),
        }
        Ok(())
    }

    /// Gather the given rows, in order, into a new column.
    #[must_use]
    pub fn take(&self, rows: &[usize]) -> Self {
        fn gather<T: Clone>(v: &[Option<T>], rows: &[usize]) -> Vec<Option<T>> {
            rows.iter().map(|&r| v.get(r).cloned().flatten()).collect()
        }
        match self {
            Self::Int(v) => Self::Int(gather(v, rows)),
            Self::Float(v) => Self::Float(gather(v, rows)),
            Self::Str(v) => Self::Str(gather(v, rows)),
            Self::Bool(v) => Self::Bool(gather(v, rows)),
        }
    }

    /// Like [`ColumnData::take`], but `None` positions become nulls.
    #[must_use]
    pub fn take_optional(&self, rows: &[Option<usize>]) -> Self {
        fn gather<T: Clone>(v: &[Option<T>], rows: &[Option<usize>]) -> Vec<Option<T>> {
            rows.iter()
                .map(|r| r.and_then(|r| v.get(r).cloned().flatten()))
                .collect()
        }
        match self {
            Self::Int(v) => Self::Int(gather(v, rows)),
            Self::Float(v) => Self::Float(gather(v, rows)),
            Self::Str(v) => Self::Str(gather(v, rows)),
            Self::Bool(v) => Self::Bool(gather(v, rows)),
        }
    }
}

fn infer_kind(values: &[Value]) -> Result<ColumnKind, TableError> {
    let mut kind: Option<ColumnKind> = None;
    for value in values {
        let this = match value {
            Value::Null => continue,
            Value::Int(_) => ColumnKind::Int,
            Value::Float(_) => ColumnKind::Float,
            Value::Str(_) => ColumnKind::Str,
            Value::Bool(_) => ColumnKind::Bool,
        };
        kind = match (kind, this) {
            (None, k) => Some(k),
            (Some(a), b) if a == b => Some(a),
            (Some(ColumnKind::Int), ColumnKind::Float) | (Some(ColumnKind::Float), ColumnKind::Int) => {
                Some(ColumnKind::Float)
            }
            (Some(a), _) => {
                return Err(TableError::TypeMismatch {
                    column: String::new(),
                    expected: a,
                    found: value.type_name().to_string(),
                });
            }
        };
    }
    Ok(kind.unwrap_or(ColumnKind::Float))
}

macro_rules! column_from {
    ($ty:ty, $variant:ident) => {
        impl From<Vec<$ty>> for ColumnData {
            fn from(values: Vec<$ty>) -> Self {
                Self::$variant(values.into_iter().map(Some).collect())
            }
        }

        impl From<Vec<Option<$ty>>> for ColumnData {
            fn from(values: Vec<Option<$ty>>) -> Self {
                Self::$variant(values)
            }
        }
    };
}

column_from!(i64, Int);
column_from!(f64, Float);
column_from!(String, Str);
column_from!(bool, Bool);

impl From<Vec<&str>> for ColumnData {
    fn from(values: Vec<&str>) -> Self {
        Self::Str(values.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<Option<&str>>> for ColumnData {
    fn from(values: Vec<Option<&str>>) -> Self {
        Self::Str(values.into_iter().map(|s| s.map(str::to_string)).collect())
    }
}

/// A named column of a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Field name (e.g. `"owner"`).
    pub name: String,
    /// Row values.
    pub data: ColumnData,
}

impl Column {
    /// Create a named column.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<ColumnData>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_mixed_numbers_as_float() {
        let data =
            ColumnData::from_values(vec![Value::Int(1), Value::Null, Value::Float(2.5)], None).unwrap();
        assert_eq!(data, ColumnData::Float(vec![Some(1.0), None, Some(2.5)]));
    }

    #[test]
    fn test_infer_rejects_mixed_kinds() {
        let result = ColumnData::from_values(vec![Value::Int(1), "a".into()], None);
        assert!(matches!(result, Err(TableError::TypeMismatch { .. })));
    }

    #[test]
    fn test_all_null_defaults_to_float() {
        let data = ColumnData::from_values(vec![Value::Null, Value::Null], None).unwrap();
        assert_eq!(data.kind(), ColumnKind::Float);
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_set_widens_int_into_float_column() {
        let mut data = ColumnData::from(vec![1.0, 2.0]);
        data.set(0, Value::Int(5)).unwrap();
        assert_eq!(data.get(0), Value::Float(5.0));
        assert!(data.set(1, "x".into()).is_err());
    }

    #[test]
    fn test_take_and_take_optional() {
        let data = ColumnData::from(vec!["a", "b", "c"]);
        assert_eq!(data.take(&[2, 0]), ColumnData::from(vec!["c", "a"]));
        assert_eq!(
            data.take_optional(&[Some(1), None]),
            ColumnData::Str(vec![Some("b".to_string()), None])
        );
    }

    #[test]
    fn test_get_out_of_bounds_is_null() {
        let data = ColumnData::from(vec![1i64]);
        assert_eq!(data.get(5), Value::Null);
        assert_eq!(data.key_at(0), Some(Key::Int(1)));
    }
}
