//! Custom error types for docvault
//!
//! This module defines the error hierarchy for the vault using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for docvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Login attempted before any account was created
    #[error("No account configured")]
    ConfigMissing,

    /// Password hash did not match the stored credential record
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Signup attempted over an existing account without confirmation
    #[error("An account already exists; overwriting it makes existing documents unreadable")]
    AccountExists,

    /// Document operation attempted without session key material
    #[error("Vault session not initialized: log in first")]
    NotInitialized,

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Integrity check failure on a ciphertext segment.
    ///
    /// AES-GCM cannot tell a wrong key from tampered data, so the message
    /// deliberately names neither.
    #[error("Decryption failed")]
    Decryption,

    /// Cipher construction or encryption errors
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors for user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl VaultError {
    /// Create a "not found" error for documents
    pub fn document_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Document",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Whether the error should be shown to the user only as a generic failure
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::AuthenticationFailed | Self::Decryption)
    }
}

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for docvault operations
pub type VaultResult<T> = Result<T, VaultError>;
