//! Vault session
//!
//! The session owns the key material derived at login. It is passed
//! explicitly to every document operation; there is no ambient key.

use crate::crypto::{Salt, SymmetricKey};
use crate::error::{VaultError, VaultResult};

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No key material: every document operation fails with `NotInitialized`
    Uninitialized,
    /// Key material present
    Ready,
}

/// In-memory key material for one login
#[derive(Debug)]
struct KeyMaterial {
    key: SymmetricKey,
    salt: Salt,
}

/// An authenticated (or not yet authenticated) vault session
#[derive(Debug, Default)]
pub struct Session {
    material: Option<KeyMaterial>,
}

impl Session {
    /// A fresh, uninitialized session
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject key material, moving to `Ready`.
    ///
    /// Any previous key is dropped (and zeroed) first.
    pub fn initialize(&mut self, key: SymmetricKey, salt: Salt) {
        self.material = Some(KeyMaterial { key, salt });
    }

    /// Drop key material, moving back to `Uninitialized`
    pub fn clear(&mut self) {
        self.material = None;
    }

    pub fn state(&self) -> SessionState {
        if self.material.is_some() {
            SessionState::Ready
        } else {
            SessionState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// The session key, or `NotInitialized`
    pub fn key(&self) -> VaultResult<&SymmetricKey> {
        self.material
            .as_ref()
            .map(|m| &m.key)
            .ok_or(VaultError::NotInitialized)
    }

    /// The account salt the key was derived with, or `NotInitialized`
    pub fn salt(&self) -> VaultResult<&Salt> {
        self.material
            .as_ref()
            .map(|m| &m.salt)
            .ok_or(VaultError::NotInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{SALT_SIZE, KEY_SIZE};

    #[test]
    fn test_new_session_is_uninitialized() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(matches!(session.key(), Err(VaultError::NotInitialized)));
        assert!(matches!(session.salt(), Err(VaultError::NotInitialized)));
    }

    #[test]
    fn test_initialize_and_clear() {
        let mut session = Session::new();
        let salt = Salt::from_bytes([3u8; SALT_SIZE]);
        session.initialize(SymmetricKey::from_bytes([1u8; KEY_SIZE]), salt);

        assert!(session.is_ready());
        assert!(session.key().is_ok());
        assert_eq!(session.salt().unwrap(), &salt);

        session.clear();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(matches!(session.key(), Err(VaultError::NotInitialized)));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let mut session = Session::new();
        session.initialize(
            SymmetricKey::from_bytes([0x5A; KEY_SIZE]),
            Salt::from_bytes([0u8; SALT_SIZE]),
        );
        let debug = format!("{:?}", session);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("90, 90"));
    }
}
