//! # appforge_templates
//!
//! Template discovery and file-system materialization for appforge.
//!
//! Templates are directories under a templates root, each described by a
//! `template.yaml`. The [`TemplateRegistry`] scans them once; the
//! [`Materializer`] renders a template into an output directory, substituting
//! `${{NAME}}` tokens in text files and copying binary files verbatim.
//!
//! ## Example
//!
//! ```rust,no_run
//! use appforge_templates::{Materializer, TemplateRegistry};
//! use appforge_spec::Variables;
//! use std::path::Path;
//!
//! # async fn run() -> appforge_templates::TemplateResult<()> {
//! let registry = TemplateRegistry::open("templates")?;
//! let manifest = registry.load("islands")?;
//!
//! let mut variables = Variables::new();
//! variables.insert("TITLE".into(), "Acme".into());
//!
//! let operations = Materializer::default()
//!     .materialize(&manifest, Path::new("apps/acme"), &variables, false)
//!     .await;
//! for op in operations {
//!     println!("{}: {}", op.path.display(), op.outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;
pub mod manifest;
pub mod materializer;
pub mod registry;

pub use error::{TemplateError, TemplateResult};
pub use loader::{is_binary_file, TemplateLoader, MANIFEST_FILE};
pub use manifest::{TemplateDefinition, TemplateFile, TemplateFileSpec, TemplateManifest};
pub use materializer::{
    FileErrorKind, FileOperation, FileOutcome, Materializer, OperationCounts, DEFAULT_MAX_OPEN_FILES,
};
pub use registry::TemplateRegistry;
