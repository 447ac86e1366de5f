use crate::condition::Condition;
use crate::errors::{DbError, EvalError, ExecError};
use crate::parser::{parse_query, Command, InsertCommand, SelectCommand};
use crate::row::Row;
use crate::storage::TableStorage;
use crate::table::Table;
use log::debug;
use std::collections::HashMap;
use std::time::Instant;

/// Interprets parsed commands against a table map.
#[derive(Debug, Clone, Default)]
pub struct QueryExecutor;

/// Outcome of a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// INSERT
    Success {
        message: String,
        execution_time_us: u64,
    },
    /// SELECT: projected rows in table order
    Select {
        columns: Vec<String>,
        rows: Vec<Row>,
        execution_time_us: u64,
    },
}

impl QueryResult {
    /// Cells of each result row in column order, for display.
    pub fn string_rows(&self) -> Vec<Vec<String>> {
        match self {
            QueryResult::Select { columns, rows, .. } => rows.iter().map(|row| row.values_in(columns)).collect(),
            QueryResult::Success { .. } => Vec::new(),
        }
    }
}

impl QueryExecutor {
    pub fn new() -> Self {
        QueryExecutor
    }

    /// Parses and runs one statement.
    pub fn execute_sql(
        &self,
        sql: &str,
        tables: &mut HashMap<String, Table>,
        storage: &mut dyn TableStorage,
    ) -> Result<QueryResult, DbError> {
        let command = parse_query(sql)?;
        debug!("Executing {:?}", command);
        self.execute_command(command, tables, storage)
    }

    /// Runs an already parsed statement and stamps its execution time.
    pub fn execute_command(
        &self,
        command: Command,
        tables: &mut HashMap<String, Table>,
        storage: &mut dyn TableStorage,
    ) -> Result<QueryResult, DbError> {
        let start_time = Instant::now();

        let result = match command {
            Command::Select(select) => {
                let (columns, rows) = self.execute_select(&select, tables)?;
                QueryResult::Select {
                    columns,
                    rows,
                    execution_time_us: start_time.elapsed().as_micros() as u64,
                }
            }
            Command::Insert(insert) => {
                let table_name = insert.table.clone();
                self.execute_insert(insert, tables, storage)?;
                QueryResult::Success {
                    message: format!("1 row inserted into '{}'", table_name),
                    execution_time_us: start_time.elapsed().as_micros() as u64,
                }
            }
        };

        Ok(result)
    }

    /// Output column order for a SELECT; `*` expands to the declared columns.
    pub fn resolve_columns(
        &self,
        select: &SelectCommand,
        tables: &HashMap<String, Table>,
    ) -> Result<Vec<String>, ExecError> {
        let table = tables
            .get(&select.table)
            .ok_or_else(|| ExecError::unknown_table(&select.table))?;

        if select.columns.is_empty() {
            return Ok(table.columns.clone());
        }
        table.check_columns(&select.columns)?;
        Ok(select.columns.clone())
    }

    /// Filters rows with the condition (if any) and projects them onto the
    /// requested columns. Returns the output columns with the rows, which
    /// follow table order.
    pub fn execute_select(
        &self,
        select: &SelectCommand,
        tables: &HashMap<String, Table>,
    ) -> Result<(Vec<String>, Vec<Row>), ExecError> {
        let columns = self.resolve_columns(select, tables)?;
        let table = tables
            .get(&select.table)
            .ok_or_else(|| ExecError::unknown_table(&select.table))?;

        let condition = match &select.condition {
            Some(text) => {
                let condition = Condition::parse(text)?;
                if !table.has_column(&condition.column) {
                    return Err(EvalError::UnknownColumn(condition.column).into());
                }
                Some(condition)
            }
            None => None,
        };

        let mut result_rows = Vec::new();
        for row in &table.rows {
            let keep = match &condition {
                Some(condition) => condition.evaluate(row)?,
                None => true,
            };
            if keep {
                result_rows.push(row.project(&columns));
            }
        }

        Ok((columns, result_rows))
    }

    /// Appends one row and rewrites the whole table through `storage`. The
    /// row is taken back out if the write fails.
    pub fn execute_insert(
        &self,
        insert: InsertCommand,
        tables: &mut HashMap<String, Table>,
        storage: &mut dyn TableStorage,
    ) -> Result<(), ExecError> {
        let table = tables
            .get_mut(&insert.table)
            .ok_or_else(|| ExecError::unknown_table(&insert.table))?;

        let row = table.build_row(&insert.columns, &insert.values)?;
        table.insert_row(row);

        if let Err(e) = storage.store(&table.name, None, &table.to_data()) {
            table.rows.pop();
            return Err(e.into());
        }

        debug!("Inserted row into '{}' ({} rows)", table.name, table.row_count());
        Ok(())
    }
}
