//! Document service
//!
//! Encrypts on the way in and decrypts on the way out. Every operation takes
//! the [`Session`] explicitly and fails with `NotInitialized` when it holds no
//! key.
//!
//! Listing is best-effort: a record whose name or subject will not decrypt is
//! logged and skipped so one damaged record cannot hide the rest. Download is
//! all-or-nothing: any segment failing authentication fails the call.

use chrono::Utc;
use tracing::{debug, info, warn};

use super::session::Session;
use crate::crypto::{
    decrypt, encrypt, generate_nonce, subject_index, CryptoProvider, EncryptedField, Nonce,
    SymmetricKey,
};
use crate::error::{VaultError, VaultResult};
use crate::models::ids::is_id_fragment;
use crate::models::{
    DocumentId, DocumentMetadata, DocumentRecord, DocumentSummary, DownloadedDocument,
    UploadRequest, RECORD_VERSION,
};
use crate::storage::Storage;

/// Service for document management
pub struct DocumentService<'a> {
    storage: &'a Storage,
    crypto: &'a dyn CryptoProvider,
}

impl<'a> DocumentService<'a> {
    /// Create a new document service
    pub fn new(storage: &'a Storage, crypto: &'a dyn CryptoProvider) -> Self {
        Self { storage, crypto }
    }

    /// Encrypt and store one document
    pub fn upload(&self, session: &Session, request: UploadRequest) -> VaultResult<DocumentId> {
        let key = session.key()?;

        let display_name = request.display_name.trim();
        if display_name.is_empty() {
            return Err(VaultError::Validation(
                "Document name cannot be empty".into(),
            ));
        }

        let id = DocumentId::generate(self.crypto);

        let payload_nonce = generate_nonce(self.crypto);
        let payload = encrypt(self.crypto, &request.bytes, key, &payload_nonce)?;
        let name = EncryptedField::seal(self.crypto, key, display_name)?;
        let subject = EncryptedField::seal(self.crypto, key, &request.subject)?;

        let record = DocumentRecord {
            id: id.clone(),
            name,
            subject,
            subject_index: subject_index(self.crypto, key, &request.subject)?,
            payload_nonce: payload_nonce.to_base64(),
            metadata: DocumentMetadata {
                size: request.bytes.len() as u64,
                mime_type: request.mime_type,
                original_file_name: request.original_file_name,
                created_at: Utc::now(),
            },
            version: RECORD_VERSION,
        };

        self.storage.documents.insert(record, &payload)?;
        info!(id = %id.short(), size = request.bytes.len(), "document uploaded");

        Ok(id)
    }

    /// Upload several files under one display name.
    ///
    /// With more than one file, each is stored as `"<name> - <file name>"`.
    /// Blank names are rejected before anything is stored; otherwise stops at
    /// the first failure and keeps documents already stored.
    pub fn upload_many(
        &self,
        session: &Session,
        requests: Vec<UploadRequest>,
    ) -> VaultResult<Vec<DocumentId>> {
        session.key()?;

        if requests.iter().any(|r| r.display_name.trim().is_empty()) {
            return Err(VaultError::Validation(
                "Document name cannot be empty".into(),
            ));
        }

        let multiple = requests.len() > 1;
        let mut ids = Vec::with_capacity(requests.len());

        for mut request in requests {
            if multiple {
                request.display_name = format!(
                    "{} - {}",
                    request.display_name.trim(),
                    request.original_file_name
                );
            }
            ids.push(self.upload(session, request)?);
        }

        Ok(ids)
    }

    /// Fetch and decrypt a document
    pub fn download(&self, session: &Session, id: &DocumentId) -> VaultResult<DownloadedDocument> {
        let key = session.key()?;

        let record = self
            .storage
            .documents
            .get(id)?
            .ok_or_else(|| VaultError::document_not_found(id.as_str()))?;

        let ciphertext = self.storage.documents.read_payload(id)?;
        let nonce = Nonce::from_base64(&record.payload_nonce)?;
        let payload = decrypt(self.crypto, &ciphertext, key, &nonce)?;
        let (name, subject) = self.open_labels(key, &record)?;

        let name = if name.is_empty() {
            record.metadata.original_file_name.clone()
        } else {
            name
        };

        debug!(id = %id.short(), "document downloaded");

        Ok(DownloadedDocument {
            name,
            subject,
            payload,
            metadata: record.metadata,
        })
    }

    /// List documents, newest first, optionally restricted to an exact subject
    pub fn list(&self, session: &Session, subject: Option<&str>) -> VaultResult<Vec<DocumentSummary>> {
        let key = session.key()?;

        let filter = match subject {
            Some(subject) => Some(subject_index(self.crypto, key, subject)?),
            None => None,
        };

        let records = self.storage.documents.list(filter.as_deref())?;
        let mut summaries = Vec::with_capacity(records.len());

        for record in records {
            match self.open_labels(key, &record) {
                Ok((name, subject)) => summaries.push(DocumentSummary {
                    id: record.id,
                    name,
                    subject,
                    metadata: record.metadata,
                }),
                Err(e) => warn!(id = %record.id.short(), error = %e, "skipping undecryptable document"),
            }
        }

        Ok(summaries)
    }

    /// Permanently delete a document.
    ///
    /// Deleting an id that does not exist succeeds without effect.
    pub fn delete(&self, session: &Session, id: &DocumentId) -> VaultResult<()> {
        session.key()?;

        if self.storage.documents.delete(id)? {
            info!(id = %id.short(), "document deleted");
        } else {
            debug!(id = %id.short(), "delete of unknown document");
        }

        Ok(())
    }

    /// Resolve a full id or a unique id prefix.
    ///
    /// A full-length id is returned as is, whether or not it is stored.
    pub fn resolve(&self, reference: &str) -> VaultResult<DocumentId> {
        let reference = reference.trim();
        if let Ok(id) = DocumentId::parse(reference) {
            return Ok(id);
        }
        if !is_id_fragment(reference) {
            return Err(VaultError::Validation(format!(
                "Invalid document id: '{}'",
                reference
            )));
        }

        let mut matches = self.storage.documents.find_by_prefix(reference)?;
        match matches.len() {
            0 => Err(VaultError::document_not_found(reference)),
            1 => Ok(matches.remove(0)),
            n => Err(VaultError::Validation(format!(
                "Id prefix '{}' matches {} documents",
                reference, n
            ))),
        }
    }

    fn open_labels(&self, key: &SymmetricKey, record: &DocumentRecord) -> VaultResult<(String, String)> {
        let name = record.name.open(self.crypto, key)?;
        let subject = record.subject.open(self.crypto, key)?;
        Ok((name, subject))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::config::paths::VaultPaths;
    use crate::crypto::provider::testing::DeterministicCrypto;
    use crate::crypto::{Salt, SystemCrypto, KEY_SIZE, SALT_SIZE};
    use crate::services::AuthService;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn session_with_key(byte: u8) -> Session {
        let mut session = Session::new();
        session.initialize(
            SymmetricKey::from_bytes([byte; KEY_SIZE]),
            Salt::from_bytes([0u8; SALT_SIZE]),
        );
        session
    }

    fn text_upload(name: &str, subject: &str, body: &str) -> UploadRequest {
        UploadRequest::new(body.as_bytes(), name, subject).with_file_info("notes.txt", "text/plain")
    }

    #[test]
    fn test_upload_and_download() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service
            .upload(&session, text_upload("Lecture 1", "Math", "integrals"))
            .unwrap();

        let doc = service.download(&session, &id).unwrap();
        assert_eq!(doc.name, "Lecture 1");
        assert_eq!(doc.subject, "Math");
        assert_eq!(doc.payload, b"integrals");
        assert_eq!(doc.metadata.size, 9);
        assert_eq!(doc.metadata.mime_type, "text/plain");
        assert_eq!(doc.metadata.original_file_name, "notes.txt");
    }

    #[test]
    fn test_nothing_stored_in_plaintext() {
        let (temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service
            .upload(&session, text_upload("Secret Title", "Chemistry", "payload-body"))
            .unwrap();

        let dir = temp_dir.path().join("documents");
        let record = fs::read_to_string(dir.join(format!("{}.json", id))).unwrap();
        let blob = fs::read(dir.join(format!("{}.bin", id))).unwrap();

        assert!(!record.contains("Secret Title"));
        assert!(!record.contains("Chemistry"));
        assert!(!record.contains("payload-body"));
        assert!(!blob.windows(12).any(|w| w == b"payload-body"));
    }

    #[test]
    fn test_segments_use_distinct_nonces() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = DeterministicCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service
            .upload(&session, text_upload("Same", "Same", "Same"))
            .unwrap();
        let record = storage.documents.get(&id).unwrap().unwrap();

        assert_ne!(record.name.nonce, record.subject.nonce);
        assert_ne!(record.name.nonce, record.payload_nonce);
        assert_ne!(record.subject.nonce, record.payload_nonce);
        // Same plaintext under different nonces gives different ciphertext
        assert_ne!(record.name.ciphertext, record.subject.ciphertext);
    }

    #[test]
    fn test_operations_require_ready_session() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let ready = session_with_key(7);
        let id = service.upload(&ready, text_upload("a", "b", "c")).unwrap();

        let session = Session::new();
        assert!(matches!(
            service.upload(&session, text_upload("a", "b", "c")),
            Err(VaultError::NotInitialized)
        ));
        assert!(matches!(service.download(&session, &id), Err(VaultError::NotInitialized)));
        assert!(matches!(service.list(&session, None), Err(VaultError::NotInitialized)));
        assert!(matches!(service.delete(&session, &id), Err(VaultError::NotInitialized)));

        // Nothing was deleted
        assert_eq!(storage.documents.count().unwrap(), 1);
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let result = service.upload(&session, text_upload("  ", "Math", "x"));
        assert!(result.unwrap_err().is_validation());
        assert_eq!(storage.documents.count().unwrap(), 0);
    }

    #[test]
    fn test_name_is_stored_trimmed() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service
            .upload(&session, text_upload("  Lecture 2 \n", "Math", "x"))
            .unwrap();
        assert_eq!(service.download(&session, &id).unwrap().name, "Lecture 2");
    }

    #[test]
    fn test_upload_many_rejects_blank_shared_name() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let requests = vec![
            UploadRequest::new(b"1".to_vec(), "   ", "Math").with_file_info("a.pdf", "application/pdf"),
            UploadRequest::new(b"2".to_vec(), "   ", "Math").with_file_info("b.pdf", "application/pdf"),
        ];
        let result = service.upload_many(&session, requests);

        assert!(result.unwrap_err().is_validation());
        assert_eq!(storage.documents.count().unwrap(), 0);
    }

    #[test]
    fn test_upload_many_trims_shared_name() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let requests = vec![
            UploadRequest::new(b"1".to_vec(), " Week 4 ", "Math").with_file_info("a.pdf", "application/pdf"),
            UploadRequest::new(b"2".to_vec(), " Week 4 ", "Math").with_file_info("b.pdf", "application/pdf"),
        ];
        let ids = service.upload_many(&session, requests).unwrap();

        assert_eq!(service.download(&session, &ids[0]).unwrap().name, "Week 4 - a.pdf");
    }

    #[test]
    fn test_empty_payload() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service
            .upload(&session, UploadRequest::new(Vec::<u8>::new(), "Empty", "Misc"))
            .unwrap();
        let doc = service.download(&session, &id).unwrap();

        assert!(doc.payload.is_empty());
        assert_eq!(doc.metadata.size, 0);
        assert_eq!(doc.metadata.mime_type, "application/octet-stream");
    }

    #[test]
    fn test_list_filters_by_subject() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        service.upload(&session, text_upload("A", "Math", "1")).unwrap();
        service.upload(&session, text_upload("B", "Physics", "2")).unwrap();
        service.upload(&session, text_upload("C", "Math", "3")).unwrap();

        let math = service.list(&session, Some("Math")).unwrap();
        let mut names: Vec<_> = math.iter().map(|d| d.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["A", "C"]);
        assert!(math.iter().all(|d| d.subject == "Math"));

        assert_eq!(service.list(&session, None).unwrap().len(), 3);
        assert!(service.list(&session, Some("Biology")).unwrap().is_empty());
        // Exact match only
        assert!(service.list(&session, Some("math")).unwrap().is_empty());
    }

    #[test]
    fn test_list_newest_first() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let first = service.upload(&session, text_upload("first", "S", "1")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = service.upload(&session, text_upload("second", "S", "2")).unwrap();

        let ids: Vec<_> = service
            .list(&session, None)
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_subject_filter_survives_new_session() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let auth = AuthService::new(&storage, &crypto);
        let service = DocumentService::new(&storage, &crypto);

        let mut session = Session::new();
        auth.signup("Str0ngPass!", false, &mut session).unwrap();
        service.upload(&session, text_upload("A", "Math", "1")).unwrap();
        auth.logout(&mut session);

        let mut later = Session::new();
        auth.login("Str0ngPass!", &mut later).unwrap();
        let docs = service.list(&later, Some("Math")).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "A");
    }

    #[test]
    fn test_account_lifecycle_with_documents() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let auth = AuthService::new(&storage, &crypto);
        let service = DocumentService::new(&storage, &crypto);

        let mut session = Session::new();
        auth.signup("Str0ngPass!", false, &mut session).unwrap();
        let id = service
            .upload(&session, UploadRequest::new(b"0123456789".to_vec(), "Notes", "Math"))
            .unwrap();
        auth.logout(&mut session);

        auth.login("Str0ngPass!", &mut session).unwrap();
        let doc = service.download(&session, &id).unwrap();
        assert_eq!(doc.name, "Notes");
        assert_eq!(doc.payload, b"0123456789");

        let math = service.list(&session, Some("Math")).unwrap();
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].name, "Notes");
        assert!(service.list(&session, Some("Physics")).unwrap().is_empty());

        assert!(matches!(
            auth.login("wrong", &mut session),
            Err(VaultError::AuthenticationFailed)
        ));
        assert!(matches!(
            service.upload(&session, text_upload("x", "Math", "y")),
            Err(VaultError::NotInitialized)
        ));
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service.upload(&session, text_upload("A", "Math", "1")).unwrap();
        service.delete(&session, &id).unwrap();

        assert!(service.download(&session, &id).unwrap_err().is_not_found());
        assert!(service.list(&session, None).unwrap().is_empty());

        // Unknown id is a no-op
        service.delete(&session, &id).unwrap();
    }

    #[test]
    fn test_download_unknown_id() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = DocumentId::generate(&crypto);
        assert!(service.download(&session, &id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_tampered_name_skipped_by_list_but_fails_download() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let good = service.upload(&session, text_upload("good", "S", "1")).unwrap();
        let bad = service.upload(&session, text_upload("bad", "S", "2")).unwrap();

        let mut record = storage.documents.get(&bad).unwrap().unwrap();
        let payload = storage.documents.read_payload(&bad).unwrap();
        let mut ciphertext = record.name.decode_ciphertext().unwrap();
        ciphertext[0] ^= 0x01;
        record.name = EncryptedField::new(&record.name.decode_nonce().unwrap(), &ciphertext);
        storage.documents.insert(record, &payload).unwrap();

        let listed = service.list(&session, None).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, good);

        assert!(matches!(service.download(&session, &bad), Err(VaultError::Decryption)));
    }

    #[test]
    fn test_tampered_payload_fails_download() {
        let (temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service.upload(&session, text_upload("doc", "S", "body")).unwrap();

        let blob = temp_dir.path().join("documents").join(format!("{}.bin", id));
        let mut bytes = fs::read(&blob).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x80;
        fs::write(&blob, bytes).unwrap();

        // Labels still decrypt, so the listing keeps it
        assert_eq!(service.list(&session, None).unwrap().len(), 1);
        assert!(matches!(service.download(&session, &id), Err(VaultError::Decryption)));
    }

    #[test]
    fn test_wrong_key_sees_nothing() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let owner = session_with_key(7);
        let id = service.upload(&owner, text_upload("A", "Math", "1")).unwrap();

        let intruder = session_with_key(8);
        assert!(service.list(&intruder, None).unwrap().is_empty());
        assert!(service.list(&intruder, Some("Math")).unwrap().is_empty());
        assert!(matches!(service.download(&intruder, &id), Err(VaultError::Decryption)));
    }

    #[test]
    fn test_download_falls_back_to_file_name() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service.upload(&session, text_upload("x", "S", "1")).unwrap();
        let payload = storage.documents.read_payload(&id).unwrap();
        let mut record = storage.documents.get(&id).unwrap().unwrap();
        record.name = EncryptedField::seal(&crypto, session.key().unwrap(), "").unwrap();
        storage.documents.insert(record, &payload).unwrap();

        assert_eq!(service.download(&session, &id).unwrap().name, "notes.txt");
    }

    #[test]
    fn test_upload_many_names_each_file() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = SystemCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let requests = vec![
            UploadRequest::new(b"1".to_vec(), "Week 3", "Math").with_file_info("a.pdf", "application/pdf"),
            UploadRequest::new(b"2".to_vec(), "Week 3", "Math").with_file_info("b.pdf", "application/pdf"),
        ];
        let ids = service.upload_many(&session, requests).unwrap();
        assert_eq!(ids.len(), 2);

        assert_eq!(service.download(&session, &ids[0]).unwrap().name, "Week 3 - a.pdf");
        assert_eq!(service.download(&session, &ids[1]).unwrap().name, "Week 3 - b.pdf");

        let single = service
            .upload_many(&session, vec![text_upload("Solo", "Math", "3")])
            .unwrap();
        assert_eq!(service.download(&session, &single[0]).unwrap().name, "Solo");
    }

    #[test]
    fn test_resolve_prefix() {
        let (_temp_dir, storage) = create_test_storage();
        let crypto = DeterministicCrypto::new();
        let service = DocumentService::new(&storage, &crypto);
        let session = session_with_key(7);

        let id = service.upload(&session, text_upload("A", "S", "1")).unwrap();

        assert_eq!(service.resolve(id.as_str()).unwrap(), id);
        assert_eq!(service.resolve(&id.as_str()[..10]).unwrap(), id);
        assert!(service.resolve("zzzz").unwrap_err().is_not_found());
        assert!(service.resolve("zzzz/../x").unwrap_err().is_validation());
        assert!(service.resolve("").unwrap_err().is_validation());
    }
}
