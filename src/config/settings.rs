//! User settings for docvault
//!
//! Preferences for the terminal front end. Nothing secret lives here: the
//! credential record is kept in the separate `config` table.

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::error::VaultError;
use crate::models::ListOrder;
use crate::storage::write_json_atomic;

/// User settings for docvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Minimum master password length accepted at signup
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Order used by `list` when none is given
    #[serde(default)]
    pub default_sort: ListOrder,

    /// `tracing` filter used when `RUST_LOG` is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_min_password_length() -> usize {
    8
}

fn default_log_filter() -> String {
    "docvault=warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            min_password_length: default_min_password_length(),
            default_sort: ListOrder::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    pub fn load_or_create(paths: &VaultPaths) -> Result<Self, VaultError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| VaultError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                VaultError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
