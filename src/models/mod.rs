//! Core data models for docvault
//!
//! Document records as persisted, plus the decrypted views handed back to
//! callers.

pub mod document;
pub mod ids;

pub use document::{
    sort_documents, DocumentMetadata, DocumentRecord, DocumentSummary, DownloadedDocument,
    ListOrder, UploadRequest, RECORD_VERSION,
};
pub use ids::DocumentId;
