//! Account CLI commands
//!
//! Implements account setup, status and the full data wipe.

use clap::Subcommand;

use super::prompt::{confirm, read_new_password};
use crate::config::settings::Settings;
use crate::crypto::CryptoProvider;
use crate::error::{VaultError, VaultResult};
use crate::services::{AuthService, PasswordStrength, Session};
use crate::storage::Storage;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Create the vault account (master password)
    Init {
        /// Replace an existing account; its documents become unreadable
        #[arg(long)]
        force: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show vault location and state
    Status,
    /// Delete the account and every stored document
    Wipe {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Handle an account command
pub fn handle_account_command(
    storage: &Storage,
    settings: &Settings,
    crypto: &dyn CryptoProvider,
    cmd: AccountCommands,
) -> VaultResult<()> {
    let auth = AuthService::new(storage, crypto).with_min_password_length(settings.min_password_length);

    match cmd {
        AccountCommands::Init { force, yes } => {
            let existing = auth.has_account()?;
            if existing {
                if !force {
                    return Err(VaultError::AccountExists);
                }
                if !yes
                    && !confirm(
                        "An account already exists. Documents stored under it will become unreadable. Continue?",
                    )?
                {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let password = read_new_password()?;
            let strength = PasswordStrength::evaluate(&password);

            let mut session = Session::new();
            auth.signup(&password, existing, &mut session)?;
            settings.save(storage.paths())?;

            println!("Vault initialized at: {}", storage.paths().base_dir().display());
            println!("Password strength: {}", strength);
            if strength == PasswordStrength::Weak {
                println!("Consider a longer password with upper-case letters, digits and symbols.");
            }
        }

        AccountCommands::Status => {
            println!("docvault status");
            println!("===============");
            println!("Data directory:  {}", storage.paths().base_dir().display());
            println!(
                "Account:         {}",
                if auth.has_account()? { "configured" } else { "not configured" }
            );
            println!("Documents:       {}", storage.documents.count()?);
            println!();
            println!("Settings:");
            println!("  Default sort:        {:?}", settings.default_sort);
            println!("  Min password length: {}", settings.min_password_length);
        }

        AccountCommands::Wipe { yes } => {
            if !yes && !confirm("Permanently delete the account and ALL documents?")? {
                println!("Aborted.");
                return Ok(());
            }

            let mut session = Session::new();
            auth.wipe(&mut session)?;
            println!("All vault data deleted.");
        }
    }

    Ok(())
}
