mod config;
pub mod migrations;
pub mod quality_db;

pub use config::{Config, RemindersConfig, StorageBackend, StorageConfig};
pub use quality_db::QualityDb;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the opsroom data directory, creating it if needed.
///
/// `OPSROOM_DATA_DIR` overrides the location outright. Otherwise this is
/// `~/.config/opsroom[-dev]/`, with the `-dev` suffix when `OPSROOM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("OPSROOM_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .ok_or_else(|| ConfigError::DataDir("home directory not found".to_string()))?
                .join(".config");
            let env = std::env::var("OPSROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("opsroom-dev")
            } else {
                base_dir.join("opsroom")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
