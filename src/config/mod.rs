//! Configuration module for docvault
//!
//! - Data directory resolution
//! - Front-end settings persistence

pub mod paths;
pub mod settings;

pub use paths::VaultPaths;
pub use settings::Settings;
