//! Generate command - Render an application from its spec.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use appforge_core::{Compiler, GenerateOptions};

use super::{GlobalArgs, OutputFormat};
use crate::output;

#[derive(Args)]
pub struct GenerateArgs {
    /// Application name; the spec is read from <specs_dir>/<app>.json
    pub app: String,

    /// Template to render (defaults to the configured or dialect default)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Replace files that already exist
    #[arg(long)]
    pub overwrite: bool,

    /// Parent directory for the generated app (defaults to output_dir)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl GenerateArgs {
    fn options(&self) -> GenerateOptions {
        GenerateOptions {
            template: self.template.clone(),
            overwrite: self.overwrite,
            output: self.output.clone(),
        }
    }
}

pub async fn execute(global: &GlobalArgs, args: GenerateArgs) -> Result<()> {
    info!("Generating application: {}", args.app);

    let compiler = Compiler::open(global.load_config()?).context("Failed to open template registry")?;
    let report = compiler
        .generate(&args.app, &args.options())
        .await
        .with_context(|| format!("Failed to generate '{}'", args.app))?;
    compiler.close();

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("🏗️  Generating {}", report.app_name);
        output::print_issues(&report.validation);

        if let Some(template) = &report.template {
            println!("   Template: {}", template);
            println!("   Output:   {}", report.destination.display());
            println!();
            output::print_operations(&report.operations);

            let counts = report.counts();
            println!();
            println!(
                "Results: {} created, {} overwritten, {} skipped, {} failed",
                counts.created, counts.overwritten, counts.skipped, counts.failed
            );
        }
    }

    if !report.validation.valid {
        anyhow::bail!(
            "Spec validation failed with {} error(s); nothing was written",
            report.validation.errors.len()
        );
    }

    let failed = report.counts().failed;
    if failed > 0 {
        anyhow::bail!("{} file(s) could not be written", failed);
    }

    if args.format == OutputFormat::Text {
        println!("✅ Generated {}", report.destination.display());
    }
    Ok(())
}
