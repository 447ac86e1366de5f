use thiserror::Error;

/// Failure to recognize a query string as one of the supported statements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unsupported statement: {0}")]
    Unsupported(String),

    #[error("Unexpected input after statement: '{0}'")]
    TrailingInput(String),

    #[error("Column list has {columns} entries but value list has {values}")]
    ColumnValueCountMismatch { columns: usize, values: usize },
}

/// Failure while compiling or evaluating a WHERE condition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("Column '{0}' not found")]
    UnknownColumn(String),

    #[error("Malformed condition '{0}': expected `<column> <operator> <literal>`")]
    MalformedCondition(String),
}

/// Persistence layer failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures raised while executing a command or redistributing a table.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Table '{0}' not found")]
    UnknownTable(String),

    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Column '{0}' is listed more than once")]
    DuplicateColumn(String),

    #[error("Invalid column count: {columns} columns, {values} values")]
    ColumnValueCountMismatch { columns: usize, values: usize },

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("Shard size must be a positive integer")]
    InvalidShardSize,

    #[error("Column group {0} is empty")]
    EmptyColumnGroup(usize),

    #[error(transparent)]
    Condition(#[from] EvalError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Crate-level error returned by the store and the command loop.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExecError {
    pub fn unknown_table(table_name: &str) -> Self {
        ExecError::UnknownTable(table_name.to_string())
    }

    pub fn unknown_column(table_name: &str, column_name: &str) -> Self {
        ExecError::UnknownColumn {
            table: table_name.to_string(),
            column: column_name.to_string(),
        }
    }
}

impl DbError {
    /// True when the underlying failure is an unknown table, whichever layer raised it.
    pub fn is_unknown_table(&self) -> bool {
        matches!(self, DbError::Exec(ExecError::UnknownTable(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_error_wraps_into_exec_error() {
        let err: ExecError = EvalError::UnknownColumn("age".to_string()).into();
        assert!(matches!(err, ExecError::Condition(EvalError::UnknownColumn(ref c)) if c == "age"));
        assert_eq!(err.to_string(), "Column 'age' not found");
    }

    #[test]
    fn test_db_error_display() {
        let err: DbError = ExecError::unknown_table("users").into();
        assert!(err.is_unknown_table());
        assert_eq!(err.to_string(), "Execution error: Table 'users' not found");

        let err: DbError = ParseError::ColumnValueCountMismatch { columns: 2, values: 1 }.into();
        assert!(!err.is_unknown_table());
        assert!(err.to_string().starts_with("Parse error:"));
    }
}
