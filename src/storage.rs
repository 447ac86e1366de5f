use crate::errors::StorageError;
use crate::row::Row;
use crate::scaling::FragmentId;
use crate::types::is_identifier;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk document for a table or a fragment: `{"columns": [...], "rows": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

/// Durable home for tables and their fragments.
///
/// A document is keyed by table name plus an optional fragment id; `None`
/// addresses the base table.
pub trait TableStorage {
    fn store(&mut self, table: &str, fragment: Option<FragmentId>, data: &TableData) -> Result<(), StorageError>;

    fn load(&self, table: &str, fragment: Option<FragmentId>) -> Result<Option<TableData>, StorageError>;

    /// Names of the stored base tables, sorted.
    fn table_names(&self) -> Result<Vec<String>, StorageError>;
}

/// One pretty-printed JSON file per document under a data directory:
/// `users.json`, `users.shard-0.json`, `users.partition-1.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    data_directory: PathBuf,
}

impl JsonFileStorage {
    /// Storage rooted at `data_directory`; it is created on first write.
    pub fn new(data_directory: impl Into<PathBuf>) -> Self {
        Self {
            data_directory: data_directory.into(),
        }
    }

    pub fn data_directory(&self) -> &Path {
        &self.data_directory
    }

    /// Path of the document for `table` and `fragment`.
    pub fn file_path(&self, table: &str, fragment: Option<FragmentId>) -> PathBuf {
        let file_name = match fragment {
            None => format!("{}.json", table),
            Some(id) => format!("{}.{}-{}.json", table, id.kind.file_tag(), id.index),
        };
        self.data_directory.join(file_name)
    }

    fn ensure_data_directory(&self) -> Result<(), StorageError> {
        if !self.data_directory.exists() {
            fs::create_dir_all(&self.data_directory)?;
        }
        Ok(())
    }
}

impl TableStorage for JsonFileStorage {
    fn store(&mut self, table: &str, fragment: Option<FragmentId>, data: &TableData) -> Result<(), StorageError> {
        self.ensure_data_directory()?;

        let path = self.file_path(table, fragment);
        let json_content = serde_json::to_string_pretty(data)?;

        // Write beside the target and rename so readers never see a torn file.
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json_content)?;
        fs::rename(&tmp_path, &path)?;

        debug!("Stored {} rows to {}", data.rows.len(), path.display());
        Ok(())
    }

    fn load(&self, table: &str, fragment: Option<FragmentId>) -> Result<Option<TableData>, StorageError> {
        let path = self.file_path(table, fragment);
        if !path.exists() {
            return Ok(None);
        }

        let json_content = fs::read_to_string(&path)?;
        let data = serde_json::from_str(&json_content)?;
        Ok(Some(data))
    }

    fn table_names(&self) -> Result<Vec<String>, StorageError> {
        if !self.data_directory.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.data_directory)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            // Fragment stems contain a '.', which identifiers never do.
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_identifier(stem) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Keeps documents in a map. Used by tests and by throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    documents: HashMap<(String, Option<FragmentId>), TableData>,
    fail_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `store` fail, to exercise rollback paths.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of stored documents, base tables and fragments alike.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Fragment ids stored for `table`, ordered by kind then index.
    pub fn fragments_of(&self, table: &str) -> Vec<FragmentId> {
        let mut ids: Vec<FragmentId> = self
            .documents
            .keys()
            .filter(|(name, _)| name == table)
            .filter_map(|(_, fragment)| *fragment)
            .collect();
        ids.sort();
        ids
    }
}

impl TableStorage for MemoryStorage {
    fn store(&mut self, table: &str, fragment: Option<FragmentId>, data: &TableData) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "writes disabled",
            )));
        }
        self.documents.insert((table.to_string(), fragment), data.clone());
        Ok(())
    }

    fn load(&self, table: &str, fragment: Option<FragmentId>) -> Result<Option<TableData>, StorageError> {
        Ok(self.documents.get(&(table.to_string(), fragment)).cloned())
    }

    fn table_names(&self) -> Result<Vec<String>, StorageError> {
        let mut names: Vec<String> = self
            .documents
            .keys()
            .filter(|(_, fragment)| fragment.is_none())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}
