//! Persistence errors.

use crate::model::sota::ConfigError;
use crate::repr::sota::TreeValidationError;

/// Errors raised while reading a stored model.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema version {found}, expected at most {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("expected model type '{expected}', found '{found}'")]
    WrongModelType { expected: &'static str, found: String },

    #[error("invalid tree: {0}")]
    InvalidTree(#[from] TreeValidationError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Errors raised while writing a model.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
