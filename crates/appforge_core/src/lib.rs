//! # appforge_core
//!
//! The validate-then-generate pipeline behind the `appforge` commands.
//!
//! A [`Compiler`] owns the project configuration, a spec reader and
//! validator, the template registry and a materializer:
//!
//! - **validate** reads `<specs_dir>/<name>.json` and reports every problem
//! - **generate** validates first, then renders the chosen template into
//!   `<output_dir>/<name>` and writes the route metadata file
//!
//! # Example
//!
//! ```rust,no_run
//! use appforge_core::{Compiler, ForgeConfig, GenerateOptions};
//!
//! # async fn run() -> appforge_core::CoreResult<()> {
//! let compiler = Compiler::open(ForgeConfig::default())?;
//! let report = compiler
//!     .generate("acme", &GenerateOptions::new().with_template("islands"))
//!     .await?;
//!
//! for op in &report.operations {
//!     println!("{}: {}", op.path.display(), op.outcome);
//! }
//! compiler.close();
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod report;

pub use compiler::{route_metadata, template_variables, validate_spec, Compiler, GenerateOptions};
pub use config::{ForgeConfig, CONFIG_FILE};
pub use error::{CoreError, CoreResult};
pub use report::{GenerateReport, ValidateReport};
