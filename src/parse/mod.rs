//! Parsing module for the symbol-stream exporter
//!
//! Decodes the recognizer's token-line text into [`crate::models::Symbol`]s.

pub mod tokens;

// Re-export commonly used types
pub use tokens::*;
