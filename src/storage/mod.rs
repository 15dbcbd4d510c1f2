//! Storage layer for docvault
//!
//! Two logical tables: the `config` key→value table and the `documents`
//! table. Both persist JSON with atomic writes; nothing stored here is ever
//! plaintext document content or key material.

pub mod config;
pub mod documents;
pub mod file_io;

pub use config::{ConfigRepository, CredentialRecord, MASTER_PASSWORD_HASH, MASTER_SALT};
pub use documents::DocumentRepository;
pub use file_io::write_json_atomic;

use tracing::info;

use crate::config::paths::VaultPaths;
use crate::error::VaultError;

/// Main storage coordinator that provides access to both tables
pub struct Storage {
    paths: VaultPaths,
    pub config: ConfigRepository,
    pub documents: DocumentRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: VaultPaths) -> Result<Self, VaultError> {
        paths.ensure_directories()?;

        Ok(Self {
            config: ConfigRepository::new(paths.config_file()),
            documents: DocumentRepository::new(paths.documents_dir()),
            paths,
        })
    }

    /// Open storage and load both tables
    pub fn open(paths: VaultPaths) -> Result<Self, VaultError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &VaultPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), VaultError> {
        self.config.load()?;
        self.documents.load()?;
        Ok(())
    }

    /// Whether an account has been created
    pub fn is_initialized(&self) -> Result<bool, VaultError> {
        self.config.has_credentials()
    }

    /// Full data wipe: the credential record and every document
    pub fn wipe(&self) -> Result<(), VaultError> {
        self.documents.clear()?;
        self.config.clear()?;
        self.paths.ensure_directories()?;
        info!("vault data wiped");
        Ok(())
    }
}
