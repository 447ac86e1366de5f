pub mod cli;
pub mod condition;
pub mod config;
pub mod database;
pub mod errors;
pub mod executor;
pub mod parser;
pub mod row;
pub mod scaling;
pub mod storage;
pub mod table;
pub mod types;

pub use cli::DatabaseCli;
pub use condition::{evaluate, Condition, Operator};
pub use config::DatabaseConfig;
pub use database::Database;
pub use errors::{DbError, EvalError, ExecError, ParseError, StorageError};
pub use executor::{QueryExecutor, QueryResult};
pub use parser::{parse_query, Command, InsertCommand, SelectCommand};
pub use row::Row;
pub use scaling::{horizontal_split, vertical_split, Fragment, FragmentId, FragmentKind};
pub use storage::{JsonFileStorage, MemoryStorage, TableData, TableStorage};
pub use table::Table;
pub use types::Value;
