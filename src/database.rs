use crate::errors::{DbError, ExecError};
use crate::executor::{QueryExecutor, QueryResult};
use crate::parser::Command;
use crate::scaling::{horizontal_split, vertical_split, Fragment};
use crate::storage::{JsonFileStorage, TableStorage};
use crate::table::Table;
use log::{info, warn};
use std::collections::HashMap;

/// The table store: every loaded table keyed by name, plus the storage
/// backend that inserts and splits write through.
#[derive(Debug)]
pub struct Database<S: TableStorage = JsonFileStorage> {
    tables: HashMap<String, Table>,
    storage: S,
    executor: QueryExecutor,
}

impl<S: TableStorage> Database<S> {
    /// Empty store over `storage`; nothing is loaded.
    pub fn new(storage: S) -> Self {
        Self {
            tables: HashMap::new(),
            storage,
            executor: QueryExecutor::new(),
        }
    }

    /// Store populated with every base table `storage` knows about.
    pub fn open(storage: S) -> Result<Self, DbError> {
        let mut db = Self::new(storage);
        db.load_tables()?;
        Ok(db)
    }

    /// Loads every base table from storage, replacing same-named entries.
    pub fn load_tables(&mut self) -> Result<(), DbError> {
        for table_name in self.storage.table_names()? {
            let Some(data) = self.storage.load(&table_name, None)? else {
                warn!("Table '{}' disappeared before it could be loaded", table_name);
                continue;
            };
            let table = Table::from_data(table_name.clone(), data)?;
            info!("Loaded table '{}' ({} rows)", table_name, table.row_count());
            self.tables.insert(table_name, table);
        }
        Ok(())
    }

    /// Registers a new, empty table and persists it.
    pub fn create_table(&mut self, name: &str, columns: Vec<String>) -> Result<(), DbError> {
        if self.tables.contains_key(name) {
            return Err(ExecError::TableAlreadyExists(name.to_string()).into());
        }

        let table = Table::new(name.to_string(), columns)?;
        self.storage.store(name, None, &table.to_data())?;
        info!("Created table '{}' with columns {:?}", name, table.columns);
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    /// Looks up a loaded table.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Table names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the storage backend.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Parses and runs a SELECT or INSERT statement.
    pub fn execute_sql(&mut self, sql: &str) -> Result<QueryResult, DbError> {
        self.executor.execute_sql(sql, &mut self.tables, &mut self.storage)
    }

    /// Runs an already parsed statement.
    pub fn execute_command(&mut self, command: Command) -> Result<QueryResult, DbError> {
        self.executor.execute_command(command, &mut self.tables, &mut self.storage)
    }

    /// Shards `table_name` into chunks of `shard_size` rows and stores each shard.
    pub fn horizontal_scaling(&mut self, table_name: &str, shard_size: usize) -> Result<Vec<Fragment>, DbError> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| ExecError::unknown_table(table_name))?;

        let fragments = horizontal_split(table, shard_size)?;
        Self::store_fragments(&mut self.storage, &fragments)?;

        info!(
            "Table '{}' scaled horizontally: {} rows into {} shards of up to {}",
            table_name,
            table.row_count(),
            fragments.len(),
            shard_size
        );
        Ok(fragments)
    }

    /// Partitions `table_name` by column group and stores each partition.
    pub fn vertical_scaling(&mut self, table_name: &str, column_groups: &[Vec<String>]) -> Result<Vec<Fragment>, DbError> {
        let table = self
            .tables
            .get(table_name)
            .ok_or_else(|| ExecError::unknown_table(table_name))?;

        let fragments = vertical_split(table, column_groups)?;
        Self::store_fragments(&mut self.storage, &fragments)?;

        info!(
            "Table '{}' scaled vertically into {} partitions",
            table_name,
            fragments.len()
        );
        Ok(fragments)
    }

    fn store_fragments(storage: &mut S, fragments: &[Fragment]) -> Result<(), DbError> {
        for fragment in fragments {
            storage.store(&fragment.table_name, Some(fragment.id), &fragment.to_data())?;
        }
        Ok(())
    }
}
