//! Error types for the spec module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;

/// Errors that can occur while locating or reading spec documents.
///
/// Structural problems inside a document are never reported through this
/// type; they end up in a [`ValidationResult`](crate::ValidationResult).
#[derive(Error, Debug)]
pub enum SpecError {
    #[error("Spec not found at path: {0}")]
    NotFound(PathBuf),

    #[error("Invalid spec name '{0}': names may not contain path separators")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
