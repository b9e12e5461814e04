//! Error types for templates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Errors that can occur while discovering and loading templates.
///
/// Failures while writing individual files are not errors of this type; they
/// are reported per file by the [`Materializer`](crate::Materializer).
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid manifest in template {template}: {message}")]
    InvalidManifest { template: String, message: String },

    #[error("No template.yaml found in {0}")]
    MissingManifest(PathBuf),

    #[error("Invalid exclude pattern in template {template}: {source}")]
    InvalidPattern {
        template: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
