//! Interactive prompts
//!
//! The master password is taken from `DOCVAULT_PASSWORD` when set (scripts and
//! tests), otherwise read from the terminal without echo.

use std::io::{self, Write};

use crate::crypto::SecureString;
use crate::error::{VaultError, VaultResult};

/// Environment variable that supplies the master password non-interactively
pub const PASSWORD_ENV: &str = "DOCVAULT_PASSWORD";

/// Read the master password
pub fn read_password(prompt: &str) -> VaultResult<SecureString> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecureString::new(password));
    }

    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| VaultError::Io(format!("Failed to read password: {}", e)))
}

/// Read a new master password, asking twice when interactive
pub fn read_new_password() -> VaultResult<SecureString> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecureString::new(password));
    }

    let first = read_password("New master password: ")?;
    let second = read_password("Confirm master password: ")?;

    if first.as_str() != second.as_str() {
        return Err(VaultError::Validation("Passwords do not match".into()));
    }

    Ok(first)
}

/// Ask a yes/no question; anything but "yes" or "y" is a no
pub fn confirm(prompt: &str) -> VaultResult<bool> {
    print!("{} (yes/no): ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "yes" | "y")
}
