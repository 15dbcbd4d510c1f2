//! Secure memory handling for the master password
//!
//! Passwords read from the terminal or environment are held in a
//! [`SecureString`], which wipes its buffer on drop and never prints itself.

use std::fmt;
use std::ops::Deref;

use zeroize::Zeroizing;

/// A string that zeroes its contents on drop
pub struct SecureString {
    inner: Zeroizing<String>,
}

impl SecureString {
    pub fn new(s: impl Into<String>) -> Self {
        Self {
            inner: Zeroizing::new(s.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

// Don't print the contents in Debug output
impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureString")
            .field("len", &self.inner.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_string_deref() {
        let s = SecureString::new("Str0ngPass!");
        assert_eq!(s.as_str(), "Str0ngPass!");
        assert_eq!(s.len(), 11);
    }

    #[test]
    fn test_secure_string_debug() {
        let s = SecureString::new("secret");
        let debug = format!("{:?}", s);
        assert!(!debug.contains("secret"));
        assert!(debug.contains("SecureString"));
    }
}
