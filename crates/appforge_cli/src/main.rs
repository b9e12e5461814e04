//! appforge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Failure (invalid spec, unknown template, or a file that could not be written)
//! - 2: Invalid arguments

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod output;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const FAILURE: u8 = 1;
    /// Reported by clap itself when parsing fails.
    #[allow(dead_code)]
    pub const INVALID_ARGS: u8 = 2;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Help(args) => commands::help::execute(args),
        Commands::Validate(args) => commands::validate::execute(&cli.global, args),
        Commands::Generate(args) => commands::generate::execute(&cli.global, args).await,
        Commands::Templates(args) => commands::templates::execute(&cli.global, args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(ExitCodes::FAILURE)
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_directive = if verbose {
        "appforge=debug,info"
    } else if quiet {
        "warn"
    } else {
        "appforge=info,warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // A subscriber may already be installed; keep it.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
