//! # appforge_spec
//!
//! Application spec schema, validation, and variable resolution for appforge.
//!
//! An application spec is a JSON document describing routes, a component
//! tree, variables, permissions and external data bindings. This crate:
//!
//! - **Validates** raw documents, collecting every problem with its location
//! - **Resolves** `${{NAME}}` variable references against declarations
//! - **Substitutes** variables in a single, non-recursive pass
//! - **Selects** the spec dialect declared by the `compiler` block
//!
//! ## Example
//!
//! ```rust,no_run
//! use appforge_spec::{SpecReader, SpecValidator};
//!
//! let raw = SpecReader::new("sites").read("acme").unwrap();
//! let (result, spec) = SpecValidator::new().parse(&raw);
//!
//! for error in &result.errors {
//!     eprintln!("error: {}", error);
//! }
//! if let Some(spec) = spec {
//!     println!("{} v{}", spec.application.name, spec.application.version);
//! }
//! ```

pub mod dialect;
pub mod error;
pub mod models;
pub mod path;
pub mod reader;
pub mod validator;
pub mod variables;

pub use dialect::{SpecDialect, COMPILER_ID};
pub use error::{SpecError, SpecResult};
pub use models::*;
pub use reader::SpecReader;
pub use validator::{
    ReferencePolicy, SpecValidator, ValidationIssue, ValidationResult, ValidatorOptions,
};
pub use variables::{
    is_builtin_variable, resolve_data, resolve_references, scan_tokens, substitute,
    ReferenceGraph, ReferenceReport, BUILTIN_APP_NAME, BUILTIN_APP_VERSION,
    BUILTIN_VARIABLES,
};
