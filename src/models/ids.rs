//! Document identifiers
//!
//! An id is 32 random bytes rendered as unpadded URL-safe base64, which keeps
//! it usable as a file name. No uniqueness check is performed: a collision
//! between 256-bit random values is negligible.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use crate::crypto::CryptoProvider;
use crate::error::VaultError;

/// Number of random bytes in an id
const ID_BYTES: usize = 32;

/// Length of the encoded id
pub const ID_LEN: usize = 43;

/// Identifier of a stored document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentId(String);

impl DocumentId {
    /// Create a new random ID
    pub fn generate(crypto: &dyn CryptoProvider) -> Self {
        let mut bytes = [0u8; ID_BYTES];
        crypto.fill_random(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Parse an ID from a string
    pub fn parse(s: &str) -> Result<Self, VaultError> {
        if is_id_fragment(s) && s.len() == ID_LEN {
            Ok(Self(s.to_string()))
        } else {
            Err(VaultError::Validation(format!("Invalid document id: '{}'", s)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for display
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

/// Whether `s` only uses the id alphabet (a possibly partial id)
pub fn is_id_fragment(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentId {
    type Error = VaultError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}
