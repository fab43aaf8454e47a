//! blueprint-forge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 5: Terraform write error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forge_model::ModelError;
use forge_tf::TfError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TERRAFORM_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "warn,forge=debug" } else { "warn,forge=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // Ignore a subscriber installed by an embedding process.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Write(args) => commands::write::execute(args, cli.quiet),
        Commands::Inputs(args) => commands::inputs::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<ModelError>() {
        return match err {
            ModelError::NotFound(_) => ExitCodes::INVALID_ARGS,
            ModelError::Io(_) => ExitCodes::GENERAL_ERROR,
            _ => ExitCodes::VALIDATION_FAILURE,
        };
    }

    if let Some(err) = e.downcast_ref::<TfError>() {
        return match err {
            TfError::InvalidConfig(_) => ExitCodes::VALIDATION_FAILURE,
            TfError::DeploymentExists(_) | TfError::GroupIndex { .. } => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::TERRAFORM_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("validation") {
        ExitCodes::VALIDATION_FAILURE
    } else if msg.contains("argument") || msg.contains("not found") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
