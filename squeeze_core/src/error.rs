//! Error types for the squeeze_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for squeeze_core operations
///
/// Malformed plan data is never reported here: the translator absorbs it
/// and returns `None` when nothing usable is left.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine produced segments that break exercise conservation.
    /// This is a bug in the engine, never a property of the input.
    #[error("Invariant violated in session {session_id}: {detail}")]
    Invariant { session_id: String, detail: String },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
