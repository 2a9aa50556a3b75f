//! Error types for Blueprint Guide.
//!
//! The flow state machine itself never fails; these errors describe the
//! collaborators around it (catalog loading, persistence, rendering) and
//! configuration.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems found while building or loading the static step catalogs.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Question catalog is empty")]
    NoQuestions,

    #[error("Question at position {position} declares index {index}")]
    NonContiguousIndex { position: usize, index: usize },

    #[error("Field {field} is used by more than one question")]
    DuplicateField { field: String },

    #[error("No question collects field {field}")]
    MissingField { field: String },

    #[error("Tour beat {position} is anchored to question {question}, but only {count} questions exist")]
    AnchorOutOfRange {
        position: usize,
        question: usize,
        count: usize,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Flag persistence errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to open store: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Render collaborator failures. Never fatal: the result screen degrades.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("No render endpoint configured")]
    NotConfigured,

    #[error("Render request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Render endpoint returned status {status}")]
    Status { status: u16 },

    #[error("Render response carried no artifact")]
    MissingArtifact,

    #[error("Render timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
