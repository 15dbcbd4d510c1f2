//! docvault - client-side encrypted document vault
//!
//! Documents are encrypted before they touch the disk. A master password is
//! stretched with PBKDF2-SHA-256 into an AES-256-GCM key that only ever lives
//! in memory; every document's payload, display name and subject are sealed
//! independently under fresh nonces, and subjects are filtered through a keyed
//! blind index.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Data directory and settings management
//! - `crypto`: Key derivation, authenticated encryption, blind index
//! - `error`: Custom error types
//! - `models`: Document records and decrypted views
//! - `storage`: JSON file storage layer (config and documents tables)
//! - `services`: Session, authentication and document logic
//! - `cli` / `display`: Terminal front end
//!
//! # Example
//!
//! ```rust,ignore
//! use docvault::config::VaultPaths;
//! use docvault::crypto::SystemCrypto;
//! use docvault::models::UploadRequest;
//! use docvault::services::{AuthService, DocumentService, Session};
//! use docvault::storage::Storage;
//!
//! let storage = Storage::open(VaultPaths::new()?)?;
//! let crypto = SystemCrypto::new();
//! let mut session = Session::new();
//! AuthService::new(&storage, &crypto).login("correct horse", &mut session)?;
//!
//! let docs = DocumentService::new(&storage, &crypto);
//! let id = docs.upload(&session, UploadRequest::new(bytes, "Lecture 1", "Math"))?;
//! ```

pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{VaultError, VaultResult};
