//! CLI command definitions.
//!
//! This module defines the command structure for the appforge CLI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use appforge_core::ForgeConfig;

pub mod generate;
pub mod help;
pub mod templates;
pub mod validate;

/// appforge - compile application specs into project trees
#[derive(Parser)]
#[command(name = "appforge")]
#[command(version, about = "appforge - compile application specs into project trees")]
#[command(long_about = r#"
appforge reads a declarative application spec (routes, components, variables,
permissions and data bindings), validates it, and renders a project template
from it with every ${{NAME}} variable substituted.

COMMANDS:
  validate <spec>   → Check sites/<spec>.json and report every problem
  generate <app>    → Validate sites/<app>.json, then render apps/<app>/
  templates         → List the available templates
  help [command]    → Show help

EXIT CODES:
  0 - Success
  1 - Invalid spec, unknown template, or a file that could not be written
  2 - Invalid arguments
"#)]
#[command(propagate_version = true, disable_help_subcommand = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by commands that read the project configuration.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (defaults to ./appforge.toml when present)
    #[arg(long, global = true, env = "APPFORGE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// Load the project configuration.
    pub fn load_config(&self) -> Result<ForgeConfig> {
        let current_dir = std::env::current_dir()?;
        ForgeConfig::discover(self.config.as_deref(), &current_dir).context("Failed to load configuration")
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a spec document
    Validate(validate::ValidateArgs),

    /// Generate an application from its spec
    Generate(generate::GenerateArgs),

    /// List available templates
    Templates(templates::TemplatesArgs),

    /// Show help for appforge or one of its commands
    Help(help::HelpArgs),
}

/// How a command reports its result on stdout.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
