//! Error types for MusicXML generation
//!
//! Only contract violations by the upstream producer are errors. Ordinary
//! notational noise (unsupported symbols, duplicate marks, exhausted number
//! pools) is logged and skipped instead.

use thiserror::Error;

/// Top-level conversion error type
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Articulation tag outside the known vocabulary
    #[error("Unsupported articulation: {0}")]
    UnsupportedArticulation(String),

    /// Volta token that is neither start, stop nor discontinue
    #[error("Unknown ending: {0}")]
    UnknownEnding(String),

    /// Token text that cannot be decoded
    #[error("Invalid token '{token}' on line {line}: {reason}")]
    InvalidToken {
        line: usize,
        token: String,
        reason: String,
    },

    /// Durations whose common tick resolution does not fit in 64 bits
    #[error("No common division for durations: {0}")]
    DivisionOverflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
