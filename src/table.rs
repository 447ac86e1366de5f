use crate::errors::ExecError;
use crate::row::Row;
use crate::storage::TableData;
use crate::types::{is_identifier, Value};
use log::warn;
use std::collections::HashSet;

/// In-memory table: declared column order plus rows in insertion order.
///
/// Every row holds a cell for every declared column; columns an insert did
/// not name are filled with [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table after validating its name and column list.
    pub fn new(name: String, columns: Vec<String>) -> Result<Self, ExecError> {
        if !is_identifier(&name) {
            return Err(ExecError::InvalidIdentifier(name));
        }
        validate_columns(&columns)?;

        Ok(Self {
            name,
            columns,
            rows: Vec::new(),
        })
    }

    /// Rebuilds a table from a persisted document, null-filling rows written
    /// before every row carried the full column set.
    pub fn from_data(name: String, data: TableData) -> Result<Self, ExecError> {
        let mut table = Self::new(name, data.columns)?;

        for mut row in data.rows {
            let stray: Vec<String> = row
                .data
                .keys()
                .filter(|k| !table.has_column(k))
                .cloned()
                .collect();
            for key in stray {
                warn!("Dropping undeclared column '{}' from a row of '{}'", key, table.name);
                row.data.remove(&key);
            }
            for column in &table.columns {
                if !row.contains(column) {
                    row.insert(column.clone(), Value::Null);
                }
            }
            table.rows.push(row);
        }

        Ok(table)
    }

    /// Document form for storage.
    pub fn to_data(&self) -> TableData {
        TableData {
            columns: self.columns.clone(),
            rows: self.rows.clone(),
        }
    }

    /// True if `column` is declared.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Declared columns, in order.
    pub fn get_columns(&self) -> &Vec<String> {
        &self.columns
    }

    /// All rows in insertion order.
    pub fn get_all_rows(&self) -> &Vec<Row> {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Fails with `UnknownColumn` on the first name the table does not declare.
    pub fn check_columns<'a>(&self, columns: impl IntoIterator<Item = &'a String>) -> Result<(), ExecError> {
        for column in columns {
            if !self.has_column(column) {
                return Err(ExecError::unknown_column(&self.name, column));
            }
        }
        Ok(())
    }

    /// Pairs `columns` with `values` positionally; unnamed columns become NULL.
    pub fn build_row(&self, columns: &[String], values: &[Value]) -> Result<Row, ExecError> {
        if columns.len() != values.len() {
            return Err(ExecError::ColumnValueCountMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        validate_unique(columns)?;
        self.check_columns(columns)?;

        let mut row = Row::new();
        for column in &self.columns {
            row.insert(column.clone(), Value::Null);
        }
        for (column, value) in columns.iter().zip(values) {
            row.insert(column.clone(), value.clone());
        }
        Ok(row)
    }

    /// Appends a row built by [`Table::build_row`].
    pub fn insert_row(&mut self, row: Row) {
        self.rows.push(row);
    }
}

/// Column lists must be non-empty identifiers without repeats.
pub fn validate_columns(columns: &[String]) -> Result<(), ExecError> {
    if let Some(bad) = columns.iter().find(|c| !is_identifier(c)) {
        return Err(ExecError::InvalidIdentifier(bad.clone()));
    }
    validate_unique(columns)
}

fn validate_unique(columns: &[String]) -> Result<(), ExecError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(ExecError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}
