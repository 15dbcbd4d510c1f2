//! Service layer for docvault
//!
//! The service layer provides business logic on top of the storage layer:
//! account setup and login, and document encryption on write and decryption
//! on read.

pub mod auth;
pub mod documents;
pub mod session;

pub use auth::{AuthService, PasswordStrength, DEFAULT_MIN_PASSWORD_LENGTH};
pub use documents::DocumentService;
pub use session::{Session, SessionState};
