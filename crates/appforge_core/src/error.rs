//! Error types for the core module.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that stop a command before or instead of writing files.
///
/// An invalid spec is not an error here: it comes back as a report with
/// `valid == false`. Per-file write failures are reported per file.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Output path {0} exists and is not a directory")]
    OutputNotDirectory(PathBuf),

    #[error("Spec error: {0}")]
    Spec(#[from] appforge_spec::SpecError),

    #[error("Template error: {0}")]
    Template(#[from] appforge_templates::TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
