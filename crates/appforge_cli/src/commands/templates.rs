//! Templates command - List templates and check their structure.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use appforge_templates::{TemplateLoader, TemplateRegistry};

use super::GlobalArgs;

#[derive(Args)]
pub struct TemplatesArgs {
    /// Also check that every file each template declares exists
    #[arg(long)]
    check: bool,
}

pub fn execute(global: &GlobalArgs, args: TemplatesArgs) -> Result<()> {
    let config = global.load_config()?;
    let templates_path = config.templates_dir;
    info!("Listing templates in {:?}", templates_path);

    if !templates_path.exists() {
        anyhow::bail!("Templates directory not found: {:?}", templates_path);
    }

    let registry = TemplateRegistry::open(&templates_path).context("Failed to load templates")?;
    if registry.is_empty() {
        println!("⚠️  No templates found in {}", templates_path.display());
        return Ok(());
    }

    println!("📦 {} template(s) in {}\n", registry.len(), templates_path.display());

    let loader = TemplateLoader::new(&templates_path);
    let mut failed = 0;

    for manifest in registry.manifests() {
        println!(
            "{:<16} {:<24} {} files ({} binary)",
            manifest.id,
            manifest.name,
            manifest.file_count(),
            manifest.binary_count()
        );
        if !manifest.description.is_empty() {
            println!("{:<16} {}", "", manifest.description);
        }

        if args.check {
            let issues = loader.validate_template(&manifest.dir);
            if !issues.is_empty() {
                failed += 1;
                for issue in issues {
                    println!("   ❌ {}", issue);
                }
            }
        }
    }

    registry.close();

    if failed > 0 {
        anyhow::bail!("{} template(s) have problems", failed);
    }
    Ok(())
}
