//! Path management for docvault
//!
//! ## Path Resolution Order
//!
//! 1. `DOCVAULT_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_DATA_HOME/docvault` or `~/.local/share/docvault`
//! 3. Windows: `%APPDATA%\docvault`

use std::path::PathBuf;

use crate::error::VaultError;

/// Manages all paths used by docvault
#[derive(Debug, Clone)]
pub struct VaultPaths {
    /// Base directory for all vault data
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Create a new VaultPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, VaultError> {
        let base_dir = if let Ok(custom) = std::env::var("DOCVAULT_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// The `config` table holding the credential record
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Front-end preferences
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// The `documents` table directory
    pub fn documents_dir(&self) -> PathBuf {
        self.base_dir.join("documents")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), VaultError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.documents_dir()).map_err(|e| {
            VaultError::Io(format!("Failed to create documents directory: {}", e))
        })?;

        Ok(())
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, VaultError> {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return Ok(PathBuf::from(data_home).join("docvault"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| VaultError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home)
        .join(".local")
        .join("share")
        .join("docvault"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, VaultError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| VaultError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("docvault"))
}
