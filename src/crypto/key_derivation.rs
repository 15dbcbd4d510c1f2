//! Key derivation and password verification
//!
//! The master password feeds two independent computations over the same salt:
//! PBKDF2-HMAC-SHA-256 for the AES key, and a salted SHA-256 digest that is
//! stored and compared at login.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::provider::{CryptoProvider, KEY_SIZE};
use crate::error::{VaultError, VaultResult};

/// PBKDF2 iteration count
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Size of the account salt in bytes
pub const SALT_SIZE: usize = 32;

/// Per-account salt, generated once at signup
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }

    /// Encode for the config table
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Decode from the config table
    pub fn from_base64(encoded: &str) -> VaultResult<Self> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| VaultError::Config(format!("Invalid salt encoding: {}", e)))?;

        let bytes: [u8; SALT_SIZE] = bytes.try_into().map_err(|v: Vec<u8>| {
            VaultError::Config(format!(
                "Invalid salt size: expected {}, got {}",
                SALT_SIZE,
                v.len()
            ))
        })?;

        Ok(Self(bytes))
    }

    /// Textual rendering mixed into the password hash: decimal bytes joined by commas
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Salt").field(&self.to_base64()).finish()
    }
}

/// A derived AES-256 key.
///
/// The bytes never leave the crate and are zeroed on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: [u8; KEY_SIZE],
}

impl SymmetricKey {
    pub(crate) fn expose(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    #[cfg(test)]
    pub(crate) fn from_bytes(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

/// Generate a fresh account salt
pub fn generate_salt(crypto: &dyn CryptoProvider) -> Salt {
    let mut bytes = [0u8; SALT_SIZE];
    crypto.fill_random(&mut bytes);
    Salt(bytes)
}

/// Derive the session encryption key from the master password
pub fn derive_key(crypto: &dyn CryptoProvider, password: &str, salt: &Salt) -> SymmetricKey {
    let mut key = SymmetricKey {
        key: [0u8; KEY_SIZE],
    };
    crypto.pbkdf2_sha256(password.as_bytes(), &salt.0, PBKDF2_ITERATIONS, &mut key.key);
    key
}

/// Verification hash: base64(SHA-256(password || salt text))
pub fn hash_password(crypto: &dyn CryptoProvider, password: &str, salt: &Salt) -> String {
    let mut input = Zeroizing::new(String::with_capacity(password.len() + SALT_SIZE * 4));
    input.push_str(password);
    input.push_str(&salt.as_text());

    let digest = crypto.sha256(input.as_bytes());
    STANDARD.encode(digest)
}

/// Compare a password against a stored verification hash in constant time
pub fn verify_password(
    crypto: &dyn CryptoProvider,
    password: &str,
    salt: &Salt,
    stored_hash: &str,
) -> bool {
    let computed = hash_password(crypto, password, salt);
    constant_time_eq(computed.as_bytes(), stored_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
