//! Cryptographic functions for docvault
//!
//! Provides PBKDF2-SHA-256 key derivation, AES-256-GCM authenticated
//! encryption, and a keyed blind index, all routed through a
//! [`CryptoProvider`] capability.

pub mod blind_index;
pub mod encryption;
pub mod key_derivation;
pub mod provider;
pub mod secure_memory;

pub use blind_index::subject_index;
pub use encryption::{
    decrypt, decrypt_text, encrypt, encrypt_text, generate_nonce, EncryptedField, Nonce,
};
pub use key_derivation::{
    derive_key, generate_salt, hash_password, verify_password, Salt, SymmetricKey,
    PBKDF2_ITERATIONS, SALT_SIZE,
};
pub use provider::{CryptoProvider, SystemCrypto, KEY_SIZE, NONCE_SIZE};
pub use secure_memory::SecureString;
