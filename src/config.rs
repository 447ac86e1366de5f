//! Runtime configuration.
//!
//! Read from an optional JSON file, then overridden by `SCALEDB_*`
//! environment variables, then by command-line flags in `main`.

use crate::errors::DbError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Directory holding table and fragment documents.
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,

    /// Rows per shard when `HORIZONTAL SCALING` is given no size.
    #[serde(default = "default_shard_size")]
    pub default_shard_size: usize,

    /// `env_logger` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_directory() -> PathBuf {
    PathBuf::from("data")
}

fn default_shard_size() -> usize {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_directory(),
            default_shard_size: default_shard_size(),
            log_level: default_log_level(),
        }
    }
}

impl DatabaseConfig {
    /// Reads and validates a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, DbError> {
        let content = fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    /// Parses and validates JSON config text; missing fields take defaults.
    pub fn from_json(content: &str) -> Result<Self, DbError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| DbError::Config(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `SCALEDB_DATA_DIR`, `SCALEDB_SHARD_SIZE` and `SCALEDB_LOG_LEVEL`.
    pub fn apply_env_overrides(&mut self) -> Result<(), DbError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), DbError> {
        if let Some(dir) = lookup("SCALEDB_DATA_DIR") {
            self.data_directory = PathBuf::from(dir);
        }
        if let Some(size) = lookup("SCALEDB_SHARD_SIZE") {
            self.default_shard_size = size
                .parse()
                .map_err(|_| DbError::Config(format!("SCALEDB_SHARD_SIZE is not a number: {}", size)))?;
        }
        if let Some(level) = lookup("SCALEDB_LOG_LEVEL") {
            self.log_level = level;
        }
        self.validate()
    }

    /// Rejects a zero default shard size.
    pub fn validate(&self) -> Result<(), DbError> {
        if self.default_shard_size == 0 {
            return Err(DbError::Config("default_shard_size must be positive".to_string()));
        }
        Ok(())
    }
}
