//! Document model
//!
//! A stored document is split into three independently encrypted segments
//! (payload, name, subject) plus plaintext technical metadata. The metadata is
//! left in the clear so listings can be sorted and sized without decrypting
//! anything; it leaks size, type, timestamp and original file name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::DocumentId;
use crate::crypto::EncryptedField;

/// Current on-disk record format
pub const RECORD_VERSION: u8 = 1;

fn default_version() -> u8 {
    RECORD_VERSION
}

/// Plaintext technical metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Payload size in bytes (before encryption)
    pub size: u64,
    /// Declared MIME type
    pub mime_type: String,
    /// File name the payload was read from
    pub original_file_name: String,
    /// Upload time
    pub created_at: DateTime<Utc>,
}

/// Persisted document record.
///
/// The payload ciphertext itself is stored next to the record as a blob;
/// only its nonce lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    /// Encrypted display name
    pub name: EncryptedField,
    /// Encrypted subject
    pub subject: EncryptedField,
    /// Blind index of the subject, used for filtering
    pub subject_index: String,
    /// Nonce for the payload blob (base64 encoded)
    pub payload_nonce: String,
    pub metadata: DocumentMetadata,
    #[serde(default = "default_version")]
    pub version: u8,
}

/// Input for an upload
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub display_name: String,
    pub subject: String,
    pub mime_type: String,
    pub original_file_name: String,
}

impl UploadRequest {
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        display_name: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            bytes: bytes.into(),
            display_name: display_name.into(),
            subject: subject.into(),
            mime_type: "application/octet-stream".to_string(),
            original_file_name: String::new(),
        }
    }

    pub fn with_file_info(
        mut self,
        original_file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        self.original_file_name = original_file_name.into();
        self.mime_type = mime_type.into();
        self
    }
}

/// A listing entry: decrypted name and subject, no payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub subject: String,
    pub metadata: DocumentMetadata,
}

/// A fully decrypted document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedDocument {
    pub name: String,
    pub subject: String,
    pub payload: Vec<u8>,
    pub metadata: DocumentMetadata,
}

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListOrder {
    /// Newest first
    #[default]
    DateDesc,
    DateAsc,
    NameAsc,
    NameDesc,
}

impl ListOrder {
    /// Parse from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "date-desc" | "newest" => Some(Self::DateDesc),
            "date-asc" | "oldest" => Some(Self::DateAsc),
            "name-asc" | "name" => Some(Self::NameAsc),
            "name-desc" => Some(Self::NameDesc),
            _ => None,
        }
    }
}

/// Sort summaries in place.
///
/// Names compare case-insensitively; ties fall back to creation time.
pub fn sort_documents(docs: &mut [DocumentSummary], order: ListOrder) {
    match order {
        ListOrder::DateDesc => docs.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at)),
        ListOrder::DateAsc => docs.sort_by(|a, b| a.metadata.created_at.cmp(&b.metadata.created_at)),
        ListOrder::NameAsc => docs.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.metadata.created_at.cmp(&b.metadata.created_at))
        }),
        ListOrder::NameDesc => docs.sort_by(|a, b| {
            b.name
                .to_lowercase()
                .cmp(&a.name.to_lowercase())
                .then(b.metadata.created_at.cmp(&a.metadata.created_at))
        }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::crypto::SystemCrypto;

    fn summary(name: &str, day: u32) -> DocumentSummary {
        DocumentSummary {
            id: DocumentId::generate(&SystemCrypto::new()),
            name: name.to_string(),
            subject: "Math".to_string(),
            metadata: DocumentMetadata {
                size: 10,
                mime_type: "text/plain".to_string(),
                original_file_name: format!("{}.txt", name),
                created_at: Utc.with_ymd_and_hms(2025, 1, day, 12, 0, 0).unwrap(),
            },
        }
    }

    fn names(docs: &[DocumentSummary]) -> Vec<&str> {
        docs.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_sort_orders() {
        let mut docs = vec![summary("beta", 2), summary("Alpha", 3), summary("gamma", 1)];

        sort_documents(&mut docs, ListOrder::DateDesc);
        assert_eq!(names(&docs), ["Alpha", "beta", "gamma"]);

        sort_documents(&mut docs, ListOrder::DateAsc);
        assert_eq!(names(&docs), ["gamma", "beta", "Alpha"]);

        sort_documents(&mut docs, ListOrder::NameAsc);
        assert_eq!(names(&docs), ["Alpha", "beta", "gamma"]);

        sort_documents(&mut docs, ListOrder::NameDesc);
        assert_eq!(names(&docs), ["gamma", "beta", "Alpha"]);
    }

    #[test]
    fn test_list_order_parse() {
        assert_eq!(ListOrder::parse("date-asc"), Some(ListOrder::DateAsc));
        assert_eq!(ListOrder::parse("NAME-DESC"), Some(ListOrder::NameDesc));
        assert_eq!(ListOrder::parse("size"), None);
        assert_eq!(ListOrder::default(), ListOrder::DateDesc);
    }

    #[test]
    fn test_metadata_timestamp_is_iso8601() {
        let doc = summary("Notes", 5);
        let json = serde_json::to_string(&doc.metadata).unwrap();
        assert!(json.contains("\"created_at\":\"2025-01-05T12:00:00Z\""));
    }

    #[test]
    fn test_record_version_defaults() {
        let crypto = SystemCrypto::new();
        let record = DocumentRecord {
            id: DocumentId::generate(&crypto),
            name: EncryptedField {
                nonce: "AAAAAAAAAAAAAAAA".into(),
                ciphertext: "AA==".into(),
            },
            subject: EncryptedField {
                nonce: "AAAAAAAAAAAAAAAA".into(),
                ciphertext: "AA==".into(),
            },
            subject_index: "idx".into(),
            payload_nonce: "AAAAAAAAAAAAAAAA".into(),
            metadata: summary("x", 1).metadata,
            version: RECORD_VERSION,
        };

        let mut value = serde_json::to_value(&record).unwrap();
        value.as_object_mut().unwrap().remove("version");
        let parsed: DocumentRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.version, RECORD_VERSION);
    }
}
