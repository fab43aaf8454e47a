//! Write command - Write a deployment directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use forge_model::DeploymentConfig;
use forge_tf::{DeploymentWriter, WriterSettings};

#[derive(Args)]
pub struct WriteArgs {
    /// Resolved deployment config (YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Deployment directory to write
    #[arg(short, long)]
    out: PathBuf,

    /// Replace an existing deployment, keeping its Terraform state
    #[arg(long)]
    overwrite: bool,

    /// Writer settings file (YAML)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Do not align attribute assignments
    #[arg(long)]
    no_format: bool,
}

pub fn execute(args: WriteArgs, quiet: bool) -> Result<()> {
    info!("Writing deployment from {:?}", args.config);

    let config = DeploymentConfig::from_file(&args.config)?;

    let mut settings = match &args.settings {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Writer settings file not found: {:?}", path);
            }
            WriterSettings::from_file(path)
                .with_context(|| format!("Failed to load writer settings from {:?}", path))?
        }
        None => WriterSettings::default(),
    };
    if args.no_format {
        settings = settings.with_format(false);
    }
    if quiet {
        settings = settings.quiet();
    }

    let writer = DeploymentWriter::new(settings);
    let mut stdout = std::io::stdout().lock();
    let metadata = writer.write_deployment(&config, &args.out, args.overwrite, &mut stdout)?;

    if !quiet {
        println!(
            "✅ Wrote {} deployment groups of '{}' to {}",
            metadata.deployment_groups.len(),
            metadata.blueprint_name,
            args.out.display()
        );
    }

    Ok(())
}
