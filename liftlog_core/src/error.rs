//! Error types for the liftlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for liftlog_core operations
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

    /// A record violates its invariants
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record store error (unreadable or corrupt collection)
    #[error("Store error: {0}")]
    Store(String),

    /// Import stopped part-way; `saved` workouts were persisted before the failure
    #[error("Import stopped after {saved} workout(s): {source}")]
    Import {
        saved: usize,
        #[source]
        source: Box<Error>,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
