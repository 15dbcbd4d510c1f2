//! Display formatting for terminal output
//!
//! Provides utilities for formatting documents for terminal display.

pub mod document;

pub use document::{format_document_details, format_document_list, format_size};
