use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A row maps column names to cells. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    pub data: HashMap<String, Value>,
}

impl Row {
    /// Empty row.
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Sets a cell, replacing any previous value.
    pub fn insert(&mut self, column: String, value: Value) {
        self.data.insert(column, value);
    }

    /// Cell for `column`, if the row has one.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    /// True if the row has a cell for `column`.
    pub fn contains(&self, column: &str) -> bool {
        self.data.contains_key(column)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Display text of a cell; missing cells read as `NULL`.
    pub fn get_as_string(&self, column: &str) -> String {
        match self.data.get(column) {
            Some(value) => value.to_string(),
            None => "NULL".to_string(),
        }
    }

    /// Keeps only `columns`, in their order. Columns the row lacks come back NULL.
    pub fn project(&self, columns: &[String]) -> Row {
        let mut projected = Row::new();
        for column in columns {
            let value = self.data.get(column).cloned().unwrap_or(Value::Null);
            projected.insert(column.clone(), value);
        }
        projected
    }

    /// Cells in the given column order, for display.
    pub fn values_in(&self, columns: &[String]) -> Vec<String> {
        columns.iter().map(|c| self.get_as_string(c)).collect()
    }

    /// Builds a row from column/value pairs.
    pub fn from_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut row = Self::new();
        for (column, value) in values {
            row.insert(column.into(), value.into());
        }
        row
    }
}
