//! Document repository
//!
//! Each document is two files in the documents directory: `<id>.json` holds the
//! record (encrypted name/subject, nonces, plaintext metadata) and `<id>.bin`
//! holds the payload ciphertext. The blob is written first and removed last,
//! so a record on disk always has its payload. An orphaned blob left by a
//! crash is ignored.
//!
//! Records are cached in memory with a secondary index on the subject blind
//! index; listing order follows `created_at`.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use super::file_io::{
    read_bytes, read_json_required, remove_if_exists, write_bytes_atomic, write_json_atomic,
};
use crate::error::{VaultError, VaultResult};
use crate::models::{DocumentId, DocumentRecord};

#[derive(Default)]
struct DocumentIndex {
    records: HashMap<DocumentId, DocumentRecord>,
    /// Index: subject blind index -> document ids
    by_subject: HashMap<String, BTreeSet<DocumentId>>,
}

impl DocumentIndex {
    fn insert(&mut self, record: DocumentRecord) {
        self.remove(&record.id);
        self.by_subject
            .entry(record.subject_index.clone())
            .or_default()
            .insert(record.id.clone());
        self.records.insert(record.id.clone(), record);
    }

    fn remove(&mut self, id: &DocumentId) -> Option<DocumentRecord> {
        let record = self.records.remove(id)?;
        if let Some(ids) = self.by_subject.get_mut(&record.subject_index) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_subject.remove(&record.subject_index);
            }
        }
        Some(record)
    }
}

/// Repository for document persistence
pub struct DocumentRepository {
    dir: PathBuf,
    index: RwLock<DocumentIndex>,
}

impl DocumentRepository {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            index: RwLock::new(DocumentIndex::default()),
        }
    }

    fn record_path(&self, id: &DocumentId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn blob_path(&self, id: &DocumentId) -> PathBuf {
        self.dir.join(format!("{}.bin", id))
    }

    /// Load every record from disk.
    ///
    /// Unreadable record files are logged and left out of the index rather
    /// than failing the whole load.
    pub fn load(&self) -> VaultResult<()> {
        let mut loaded = DocumentIndex::default();

        if self.dir.exists() {
            let entries = fs::read_dir(&self.dir).map_err(|e| {
                VaultError::Storage(format!("Failed to read {}: {}", self.dir.display(), e))
            })?;

            for entry in entries {
                let path = entry
                    .map_err(|e| VaultError::Storage(format!("Failed to read entry: {}", e)))?
                    .path();

                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }

                match self.load_record(&path) {
                    Ok(record) => loaded.insert(record),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable document record"),
                }
            }
        }

        debug!(count = loaded.records.len(), "loaded document index");

        let mut index = self.index.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *index = loaded;

        Ok(())
    }

    fn load_record(&self, path: &Path) -> VaultResult<DocumentRecord> {
        let record: DocumentRecord = read_json_required(path)?;

        // The file name is authoritative; a renamed record is not trusted
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if record.id.as_str() != stem {
            return Err(VaultError::Storage(format!(
                "Record id {} does not match file name",
                record.id
            )));
        }

        Ok(record)
    }

    /// Persist a record and its payload ciphertext
    pub fn insert(&self, record: DocumentRecord, payload_ciphertext: &[u8]) -> VaultResult<()> {
        let mut index = self.index.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        write_bytes_atomic(self.blob_path(&record.id), payload_ciphertext)?;
        write_json_atomic(self.record_path(&record.id), &record)?;
        debug!(id = %record.id.short(), bytes = payload_ciphertext.len(), "stored document");

        index.insert(record);
        Ok(())
    }

    /// Get a record by ID
    pub fn get(&self, id: &DocumentId) -> VaultResult<Option<DocumentRecord>> {
        let index = self.index.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(index.records.get(id).cloned())
    }

    /// Read the payload ciphertext of a record
    pub fn read_payload(&self, id: &DocumentId) -> VaultResult<Vec<u8>> {
        read_bytes(self.blob_path(id))
    }

    /// List records, newest first, optionally restricted to one subject index value
    pub fn list(&self, subject_index: Option<&str>) -> VaultResult<Vec<DocumentRecord>> {
        let index = self.index.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut records: Vec<_> = match subject_index {
            Some(value) => index
                .by_subject
                .get(value)
                .map(|ids| ids.iter().filter_map(|id| index.records.get(id).cloned()).collect())
                .unwrap_or_default(),
            None => index.records.values().cloned().collect(),
        };

        records.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
        Ok(records)
    }

    /// Ids starting with `prefix`
    pub fn find_by_prefix(&self, prefix: &str) -> VaultResult<Vec<DocumentId>> {
        let index = self.index.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut ids: Vec<_> = index
            .records
            .keys()
            .filter(|id| id.as_str().starts_with(prefix))
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Delete a record and its payload.
    ///
    /// The index entry goes as soon as the record file is gone, even if the
    /// blob then fails to delete. Returns whether anything was deleted.
    pub fn delete(&self, id: &DocumentId) -> VaultResult<bool> {
        let mut index = self.index.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        let removed_record = remove_if_exists(self.record_path(id))?;
        index.remove(id);
        let removed_blob = remove_if_exists(self.blob_path(id))?;

        Ok(removed_record || removed_blob)
    }

    /// Count records
    pub fn count(&self) -> VaultResult<usize> {
        let index = self.index.read().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(index.records.len())
    }

    /// Remove every document file
    pub fn clear(&self) -> VaultResult<()> {
        let mut index = self.index.write().map_err(|e| {
            VaultError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if self.dir.exists() {
            fs::remove_dir_all(&self.dir).map_err(|e| {
                VaultError::Storage(format!("Failed to remove {}: {}", self.dir.display(), e))
            })?;
        }
        *index = DocumentIndex::default();

        Ok(())
    }
}
