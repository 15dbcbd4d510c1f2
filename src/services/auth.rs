//! Authentication service
//!
//! Creates the credential record at signup and checks it at login. Password
//! verification (salted SHA-256 hash) and key derivation (PBKDF2) are separate
//! computations over the same stored salt; both must succeed before the
//! session is readied.

use std::fmt;

use tracing::{info, warn};

use super::session::Session;
use crate::crypto::{derive_key, generate_salt, hash_password, verify_password, CryptoProvider};
use crate::error::{VaultError, VaultResult};
use crate::storage::{CredentialRecord, Storage};

/// Minimum password length when none is configured
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// Service for account management
pub struct AuthService<'a> {
    storage: &'a Storage,
    crypto: &'a dyn CryptoProvider,
    min_password_length: usize,
}

impl<'a> AuthService<'a> {
    /// Create a new auth service
    pub fn new(storage: &'a Storage, crypto: &'a dyn CryptoProvider) -> Self {
        Self {
            storage,
            crypto,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }

    /// Override the minimum password length accepted at signup
    pub fn with_min_password_length(mut self, min: usize) -> Self {
        self.min_password_length = min;
        self
    }

    /// Whether an account exists (login rather than signup)
    pub fn has_account(&self) -> VaultResult<bool> {
        self.storage.is_initialized()
    }

    /// Create the account and ready `session`.
    ///
    /// If an account already exists, `overwrite` must be true; the old salt is
    /// replaced, so documents encrypted under the old key become unreadable.
    pub fn signup(&self, password: &str, overwrite: bool, session: &mut Session) -> VaultResult<()> {
        if password.chars().count() < self.min_password_length {
            return Err(VaultError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }

        let existing = self.has_account()?;
        if existing && !overwrite {
            return Err(VaultError::AccountExists);
        }

        let salt = generate_salt(self.crypto);
        let key = derive_key(self.crypto, password, &salt);
        let record = CredentialRecord {
            password_hash: hash_password(self.crypto, password, &salt),
            master_salt: salt,
        };
        self.storage.config.save_credentials(&record)?;

        session.initialize(key, salt);
        info!(overwrote = existing, "account created");
        Ok(())
    }

    /// Verify `password` and ready `session`.
    ///
    /// Fails closed: on any error the session holds no key.
    pub fn login(&self, password: &str, session: &mut Session) -> VaultResult<()> {
        session.clear();

        let record = self
            .storage
            .config
            .credentials()?
            .ok_or(VaultError::ConfigMissing)?;

        if !verify_password(self.crypto, password, &record.master_salt, &record.password_hash) {
            warn!("login rejected");
            return Err(VaultError::AuthenticationFailed);
        }

        let key = derive_key(self.crypto, password, &record.master_salt);
        session.initialize(key, record.master_salt);
        info!("login succeeded");
        Ok(())
    }

    /// Drop the session key
    pub fn logout(&self, session: &mut Session) {
        session.clear();
        info!("logged out");
    }

    /// Delete the credential record and every document
    pub fn wipe(&self, session: &mut Session) -> VaultResult<()> {
        session.clear();
        self.storage.wipe()
    }
}

/// Rough password strength, scored on length and character classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// One point each for: length ≥ 8, length ≥ 12, an uppercase letter, a digit, a symbol
    pub fn evaluate(password: &str) -> Self {
        let len = password.chars().count();
        let score = [
            len >= 8,
            len >= 12,
            password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ]
        .iter()
        .filter(|&&hit| hit)
        .count();

        match score {
            0 | 1 => Self::Weak,
            2 | 3 => Self::Medium,
            _ => Self::Strong,
        }
    }
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weak => write!(f, "weak"),
            Self::Medium => write!(f, "medium"),
            Self::Strong => write!(f, "strong"),
        }
    }
}
