//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod account;
pub mod document;
pub mod prompt;

pub use account::{handle_account_command, AccountCommands};
pub use document::{handle_document_command, DocumentCommands};
