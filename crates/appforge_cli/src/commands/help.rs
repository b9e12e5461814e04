//! Help command - Informational only.

use anyhow::{Context, Result};
use clap::{Args, CommandFactory};

use super::Cli;

#[derive(Args)]
pub struct HelpArgs {
    /// Command to describe
    pub command: Option<String>,
}

pub fn execute(args: HelpArgs) -> Result<()> {
    let mut cli = Cli::command();

    match args.command.as_deref() {
        Some(name) => match cli.find_subcommand_mut(name) {
            Some(sub) => sub.print_long_help()?,
            None => {
                // Unknown topics still succeed; list what exists instead.
                println!("Unknown command '{}'.\n", name);
                cli.print_long_help().context("Failed to print help")?;
            }
        },
        None => cli.print_long_help().context("Failed to print help")?,
    }

    println!();
    Ok(())
}
