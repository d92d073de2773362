//! Renderers module
//!
//! This module contains export logic for converting decoded symbols into
//! output formats.

pub mod musicxml;

// Re-export commonly used types
pub use musicxml::*;
