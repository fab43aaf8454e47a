//! Inputs command - Show what each deployment group consumes and produces.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::warn;

use forge_model::{ConfigValidator, DeploymentConfig};
use forge_tf::{DeploymentMetadata, TfWriter};

#[derive(Args)]
pub struct InputsArgs {
    /// Resolved deployment config (YAML)
    #[arg(short, long)]
    config: PathBuf,

    /// Only show this deployment group
    #[arg(short, long)]
    group: Option<String>,
}

pub fn execute(args: InputsArgs) -> Result<()> {
    let config = DeploymentConfig::from_file(&args.config)?;

    let warnings = ConfigValidator::validate(&config)
        .into_result()
        .with_context(|| format!("Invalid deployment config {:?}", args.config))?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    let writer = TfWriter::default();
    let mut groups = Vec::new();
    for (index, group) in config.deployment_groups.iter().enumerate() {
        if args.group.as_deref().is_some_and(|name| name != group.name) {
            continue;
        }
        groups.push(writer.group_metadata(&config, index)?);
    }

    if let Some(name) = &args.group {
        if groups.is_empty() {
            anyhow::bail!("Deployment group not found: {}", name);
        }
    }

    let metadata = DeploymentMetadata {
        blueprint_name: config.blueprint_name.clone(),
        deployment_groups: groups,
    };
    let yaml = serde_yaml::to_string(&metadata).context("Failed to serialize group metadata")?;
    print!("{}", yaml);

    Ok(())
}
