//! Fetched row shapes.

use crate::Result;
use crate::error::{Error, TypeError};
use crate::value::Value;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// A row keyed by column name, in column order.
///
/// Duplicate column names collapse to one key: the key keeps its first
/// position and holds the value of the last column with that name.
pub type AssociativeRow = IndexMap<String, Value>;

/// A row addressed by 0-based column position.
pub type NumericRow = Vec<Value>;

/// Column metadata shared across all rows in a result set.
///
/// Wrapped in `Arc` so every row from the same result shares one copy.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    /// Column names in order
    names: Vec<String>,
    /// Name -> index mapping; a duplicated name maps to its last column
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Create new column info from a list of column names.
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            name_to_index,
        }
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get the index of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Get the name of a column by index.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Get all column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Pair a row of values with these column names.
    pub fn associate(&self, values: Vec<Value>) -> AssociativeRow {
        let mut row = AssociativeRow::with_capacity(values.len());
        for (name, value) in self.names.iter().zip(values) {
            row.insert(name.clone(), value);
        }
        row
    }
}

/// A single fetched row with both index and name access.
///
/// This is the hybrid fetch shape; column metadata is shared via `Arc`.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<Value>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a new row with shared column metadata.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Create a standalone row, mostly useful in tests.
    pub fn new(column_names: Vec<String>, values: Vec<Value>) -> Self {
        Self::with_columns(Arc::new(ColumnInfo::new(column_names)), values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Get a typed value by column index.
    pub fn get_as<T>(&self, index: usize) -> Result<T>
    where
        T: TryFrom<Value, Error = Error>,
    {
        let value = self.get(index).ok_or_else(|| {
            Error::Type(TypeError {
                expected: std::any::type_name::<T>(),
                actual: format!(
                    "index {} out of bounds (row has {} columns)",
                    index,
                    self.len()
                ),
                column: None,
            })
        })?;
        T::try_from(value.clone())
    }

    /// Get a typed value by column name.
    pub fn get_named<T>(&self, name: &str) -> Result<T>
    where
        T: TryFrom<Value, Error = Error>,
    {
        let value = self.get_by_name(name).ok_or_else(|| {
            Error::Type(TypeError {
                expected: std::any::type_name::<T>(),
                actual: format!("column '{}' not found", name),
                column: Some(name.to_string()),
            })
        })?;
        T::try_from(value.clone()).map_err(|e| match e {
            Error::Type(mut te) => {
                te.column = Some(name.to_string());
                Error::Type(te)
            }
            e => e,
        })
    }

    /// Get all column names.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.names().iter().map(String::as_str)
    }

    /// Iterate over all values.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Iterate over (column_name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.column_names().zip(self.values.iter())
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn into_associative(self) -> AssociativeRow {
        self.columns.associate(self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> ColumnInfo {
        ColumnInfo::new(names.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn associate_keeps_column_order() {
        let info = columns(&["b", "a", "c"]);
        let row = info.associate(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn duplicate_names_keep_first_position_last_value() {
        let info = columns(&["id", "name", "id"]);
        let row = info.associate(vec![
            Value::Int(1),
            Value::Text("x".into()),
            Value::Int(9),
        ]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_index(0), Some((&"id".to_string(), &Value::Int(9))));
        assert_eq!(info.index_of("id"), Some(2));
    }

    #[test]
    fn empty_row_is_a_row() {
        let info = ColumnInfo::default();
        assert!(info.associate(Vec::new()).is_empty());
        assert!(info.is_empty());
    }

    #[test]
    fn hybrid_row_access() {
        let row = Row::new(
            vec!["id".into(), "name".into()],
            vec![Value::BigInt(7), Value::Text("Ada".into())],
        );
        assert_eq!(row.get(0), Some(&Value::BigInt(7)));
        assert_eq!(row.get_by_name("name"), Some(&Value::Text("Ada".into())));
        assert_eq!(row.get_as::<i64>(0).unwrap(), 7);
        assert_eq!(row.get_named::<String>("name").unwrap(), "Ada");
        assert!(row.get_named::<i64>("missing").is_err());

        let err = row.get_named::<i64>("name").unwrap_err();
        assert!(matches!(err, Error::Type(ref t) if t.column.as_deref() == Some("name")));

        let assoc = row.into_associative();
        assert_eq!(assoc["id"], Value::BigInt(7));
    }
}
