//! Validate command - Check a spec document.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use appforge_core::validate_spec;

use super::{GlobalArgs, OutputFormat};
use crate::output;

#[derive(Args)]
pub struct ValidateArgs {
    /// Spec name, read from <specs_dir>/<spec>.json
    pub spec: String,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

pub fn execute(global: &GlobalArgs, args: ValidateArgs) -> Result<()> {
    info!("Validating spec: {}", args.spec);

    let config = global.load_config()?;
    let report = validate_spec(&config, &args.spec)
        .with_context(|| format!("Failed to read spec '{}'", args.spec))?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("📋 Validating {}", report.spec_path.display());
            if let Some(app) = &report.application {
                println!("   {} v{} ({} routes)", app.name, app.version, report.route_count);
            }
            output::print_issues(&report.result);
            println!();
            if report.is_valid() {
                println!("✅ Spec is valid");
            }
        }
    }

    if !report.is_valid() {
        anyhow::bail!(
            "Spec validation failed with {} error(s)",
            report.result.errors.len()
        );
    }
    Ok(())
}
