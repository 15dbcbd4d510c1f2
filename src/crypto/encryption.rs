//! AES-256-GCM encryption/decryption
//!
//! Provides authenticated encryption for data at rest using AES-256-GCM.
//! Callers must draw a fresh nonce with [`generate_nonce`] before every
//! encryption; reusing a nonce under the same key breaks confidentiality.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use super::key_derivation::SymmetricKey;
use super::provider::{CryptoProvider, NONCE_SIZE};
use crate::error::{VaultError, VaultResult};

/// A 96-bit AES-GCM nonce
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    pub fn from_bytes(bytes: [u8; NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }

    /// Parse a nonce from raw bytes of unknown length
    pub fn from_slice(bytes: &[u8]) -> VaultResult<Self> {
        let bytes: [u8; NONCE_SIZE] = bytes.try_into().map_err(|_| {
            VaultError::Storage(format!(
                "Invalid nonce size: expected {}, got {}",
                NONCE_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Decode a stored base64 nonce
    pub fn from_base64(encoded: &str) -> VaultResult<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| VaultError::Storage(format!("Invalid nonce encoding: {}", e)))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Nonce").field(&STANDARD.encode(self.0)).finish()
    }
}

/// Draw a fresh nonce
pub fn generate_nonce(crypto: &dyn CryptoProvider) -> Nonce {
    let mut bytes = [0u8; NONCE_SIZE];
    crypto.fill_random(&mut bytes);
    Nonce(bytes)
}

/// Encrypt bytes; the result carries the 16-byte authentication tag
pub fn encrypt(
    crypto: &dyn CryptoProvider,
    plaintext: &[u8],
    key: &SymmetricKey,
    nonce: &Nonce,
) -> VaultResult<Vec<u8>> {
    crypto.aead_seal(key.expose(), &nonce.0, plaintext)
}

/// Decrypt bytes, failing with [`VaultError::Decryption`] if the tag does not verify
pub fn decrypt(
    crypto: &dyn CryptoProvider,
    ciphertext: &[u8],
    key: &SymmetricKey,
    nonce: &Nonce,
) -> VaultResult<Vec<u8>> {
    crypto.aead_open(key.expose(), &nonce.0, ciphertext)
}

/// Encrypt a string
pub fn encrypt_text(
    crypto: &dyn CryptoProvider,
    plaintext: &str,
    key: &SymmetricKey,
    nonce: &Nonce,
) -> VaultResult<Vec<u8>> {
    encrypt(crypto, plaintext.as_bytes(), key, nonce)
}

/// Decrypt to a string
pub fn decrypt_text(
    crypto: &dyn CryptoProvider,
    ciphertext: &[u8],
    key: &SymmetricKey,
    nonce: &Nonce,
) -> VaultResult<String> {
    let plaintext = decrypt(crypto, ciphertext, key, nonce)?;
    String::from_utf8(plaintext).map_err(|_| VaultError::Decryption)
}

/// An encrypted value with the nonce it was sealed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    /// The nonce used for this encryption (base64 encoded)
    pub nonce: String,
    /// The encrypted ciphertext with authentication tag (base64 encoded)
    pub ciphertext: String,
}

impl EncryptedField {
    /// Create a new EncryptedField from raw parts
    pub fn new(nonce: &Nonce, ciphertext: &[u8]) -> Self {
        Self {
            nonce: nonce.to_base64(),
            ciphertext: STANDARD.encode(ciphertext),
        }
    }

    /// Encrypt `plaintext` under a freshly drawn nonce
    pub fn seal(
        crypto: &dyn CryptoProvider,
        key: &SymmetricKey,
        plaintext: &str,
    ) -> VaultResult<Self> {
        let nonce = generate_nonce(crypto);
        let ciphertext = encrypt_text(crypto, plaintext, key, &nonce)?;
        Ok(Self::new(&nonce, &ciphertext))
    }

    /// Decrypt back to the original string
    pub fn open(&self, crypto: &dyn CryptoProvider, key: &SymmetricKey) -> VaultResult<String> {
        let nonce = self.decode_nonce()?;
        let ciphertext = self.decode_ciphertext()?;
        decrypt_text(crypto, &ciphertext, key, &nonce)
    }

    /// Decode the nonce from base64
    pub fn decode_nonce(&self) -> VaultResult<Nonce> {
        Nonce::from_base64(&self.nonce)
    }

    /// Decode the ciphertext from base64
    pub fn decode_ciphertext(&self) -> VaultResult<Vec<u8>> {
        STANDARD
            .decode(&self.ciphertext)
            .map_err(|e| VaultError::Storage(format!("Invalid ciphertext encoding: {}", e)))
    }
}
