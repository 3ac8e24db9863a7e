//! Configuration for the taskboard server.
//!
//! Set via environment variables:
//! - `TASKBOARD_HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `TASKBOARD_PORT` - Optional. Server port. Defaults to `8080`.
//! - `TASKBOARD_STORE` - Optional. `memory` or `file`. Defaults to `memory`.
//! - `TASKBOARD_FILE` - Optional. Backing file for the file store.
//!   Defaults to `taskboard.csv`.

use std::path::PathBuf;

use thiserror::Error;

use crate::manager::StoreKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Which manager backend to run
    pub store: StoreKind,

    /// Backing file for the file store
    pub store_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("TASKBOARD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("TASKBOARD_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("TASKBOARD_PORT".to_string(), format!("{e}")))?;

        let store = std::env::var("TASKBOARD_STORE")
            .map(|value| StoreKind::from_str(&value))
            .unwrap_or_default();

        let store_file = std::env::var("TASKBOARD_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("taskboard.csv"));

        Ok(Self {
            host,
            port,
            store,
            store_file,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            store: StoreKind::Memory,
            store_file: PathBuf::from("taskboard.csv"),
        }
    }
}
