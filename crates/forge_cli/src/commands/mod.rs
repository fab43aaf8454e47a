//! CLI command definitions.
//!
//! Each subcommand reads a resolved deployment config and either writes it
//! out as Terraform or reports what the written groups would need.

use clap::{Parser, Subcommand};

pub mod inputs;
pub mod write;

/// blueprint-forge - Terraform deployment group writer
#[derive(Parser)]
#[command(name = "forge")]
#[command(version, about = "blueprint-forge - Terraform deployment group writer")]
#[command(long_about = r#"
blueprint-forge turns a resolved deployment config into one Terraform root
module per deployment group.

COMMANDS:
  write   → Write every deployment group into a deployment directory
  inputs  → Show the variables each group consumes and the outputs it exposes

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  5 - Terraform write error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a deployment directory from a deployment config
    Write(write::WriteArgs),

    /// Show each group's deployment inputs, intergroup inputs and outputs
    Inputs(inputs::InputsArgs),
}
