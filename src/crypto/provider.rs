//! Cryptographic capability interface
//!
//! Every primitive the vault needs (randomness, PBKDF2, AES-256-GCM, SHA-256,
//! HMAC-SHA-256) goes through [`CryptoProvider`], so the higher layers can be
//! exercised with a deterministic fake.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::error::{VaultError, VaultResult};

/// Length of an AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Length of an AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Platform cryptographic primitives
pub trait CryptoProvider: Send + Sync {
    /// Fill `buf` with cryptographically secure random bytes
    fn fill_random(&self, buf: &mut [u8]);

    /// PBKDF2-HMAC-SHA-256 into `out`
    fn pbkdf2_sha256(&self, password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]);

    /// AES-256-GCM encryption; the returned ciphertext carries the tag
    fn aead_seal(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> VaultResult<Vec<u8>>;

    /// AES-256-GCM decryption; fails with [`VaultError::Decryption`] on tag mismatch
    fn aead_open(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> VaultResult<Vec<u8>>;

    /// SHA-256 digest
    fn sha256(&self, data: &[u8]) -> [u8; 32];

    /// HMAC-SHA-256 tag
    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> VaultResult<[u8; 32]>;
}

/// RustCrypto-backed provider using the operating system RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCrypto;

impl SystemCrypto {
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for SystemCrypto {
    fn fill_random(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }

    fn pbkdf2_sha256(&self, password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) {
        pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, out);
    }

    fn aead_seal(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        plaintext: &[u8],
    ) -> VaultResult<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))?;

        cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| VaultError::Encryption(format!("Encryption failed: {}", e)))
    }

    fn aead_open(
        &self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        ciphertext: &[u8],
    ) -> VaultResult<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| VaultError::Encryption(format!("Failed to create cipher: {}", e)))?;

        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| VaultError::Decryption)
    }

    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> VaultResult<[u8; 32]> {
        let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(key)
            .map_err(|e| VaultError::Encryption(format!("Invalid HMAC key: {}", e)))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }
}
