//! Config table repository
//!
//! A small key→value table persisted to `config.json`. The vault's credential
//! record lives here under `masterPasswordHash` and `masterSalt`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::file_io::{read_json, write_json_atomic};
use crate::crypto::Salt;
use crate::error::{VaultError, VaultResult};

/// Key of the stored password verification hash
pub const MASTER_PASSWORD_HASH: &str = "masterPasswordHash";

/// Key of the base64 account salt
pub const MASTER_SALT: &str = "masterSalt";

/// Serializable config table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigData {
    entries: BTreeMap<String, String>,
}

/// The persisted credential record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub password_hash: String,
    pub master_salt: Salt,
}

/// Repository for the config table
pub struct ConfigRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
}

impl ConfigRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    /// Load the table from disk
    pub fn load(&self) -> VaultResult<()> {
        let file_data: ConfigData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *data = file_data.entries;

        Ok(())
    }

    /// Get a value
    pub fn get(&self, key: &str) -> VaultResult<Option<String>> {
        let data = self.data.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.get(key).cloned())
    }

    /// Set a value and persist the table
    pub fn set(&self, key: &str, value: impl Into<String>) -> VaultResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.into());
        })
    }

    /// Remove a value and persist the table
    pub fn remove(&self, key: &str) -> VaultResult<()> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    /// Whether a credential record exists
    pub fn has_credentials(&self) -> VaultResult<bool> {
        Ok(self.get(MASTER_PASSWORD_HASH)?.is_some())
    }

    /// Read the credential record.
    ///
    /// Returns `None` unless both keys are present.
    pub fn credentials(&self) -> VaultResult<Option<CredentialRecord>> {
        let (hash, salt) = match (self.get(MASTER_PASSWORD_HASH)?, self.get(MASTER_SALT)?) {
            (Some(hash), Some(salt)) => (hash, salt),
            _ => return Ok(None),
        };

        Ok(Some(CredentialRecord {
            password_hash: hash,
            master_salt: Salt::from_base64(&salt)?,
        }))
    }

    /// Replace the credential record in a single write
    pub fn save_credentials(&self, record: &CredentialRecord) -> VaultResult<()> {
        self.update(|entries| {
            entries.insert(MASTER_PASSWORD_HASH.to_string(), record.password_hash.clone());
            entries.insert(MASTER_SALT.to_string(), record.master_salt.to_base64());
        })
    }

    /// Drop every entry and remove the file
    pub fn clear(&self) -> VaultResult<()> {
        let mut data = self.data.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        data.clear();
        super::file_io::remove_if_exists(&self.path)?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> VaultResult<()> {
        let mut data = self.data.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let mut next = data.clone();
        f(&mut next);

        write_json_atomic(
            &self.path,
            &ConfigData {
                entries: next.clone(),
            },
        )?;
        *data = next;

        Ok(())
    }
}
