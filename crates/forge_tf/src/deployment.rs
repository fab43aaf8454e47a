//! Writing a whole deployment directory.
//!
//! Layout of a written deployment:
//!
//! ```text
//! <deployment_dir>/
//!   <group>/                      one directory per deployment group
//!   .forge/
//!     deployment_metadata.yaml    inputs and outputs of every group
//!     previous_deployment_groups/ group directories replaced by the last overwrite
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs_extra::dir::CopyOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use forge_model::{ConfigValidator, DeploymentConfig};

use crate::error::{TfError, TfResult};
use crate::settings::WriterSettings;
use crate::state::StateCarrier;
use crate::writer::{GroupMetadata, TfWriter};

/// Directory holding the writer's own bookkeeping.
pub const HIDDEN_DIR: &str = ".forge";

/// Archive of group directories replaced by an overwrite.
pub const PREVIOUS_GROUPS_DIR: &str = "previous_deployment_groups";

pub const METADATA_FILE: &str = "deployment_metadata.yaml";

/// Metadata of a written deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentMetadata {
    pub blueprint_name: String,
    pub deployment_groups: Vec<GroupMetadata>,
}

impl DeploymentMetadata {
    pub fn group(&self, name: &str) -> Option<&GroupMetadata> {
        self.deployment_groups.iter().find(|g| g.name == name)
    }

    /// Load the metadata of a previously written deployment.
    pub fn load(deployment_dir: &Path) -> TfResult<Self> {
        let content = fs::read_to_string(metadata_path(deployment_dir))?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// `<deployment_dir>/.forge/previous_deployment_groups`
pub fn previous_groups_path(deployment_dir: &Path) -> PathBuf {
    deployment_dir.join(HIDDEN_DIR).join(PREVIOUS_GROUPS_DIR)
}

/// `<deployment_dir>/.forge/deployment_metadata.yaml`
pub fn metadata_path(deployment_dir: &Path) -> PathBuf {
    deployment_dir.join(HIDDEN_DIR).join(METADATA_FILE)
}

/// Writes every group of a deployment config into one directory.
pub struct DeploymentWriter {
    writer: TfWriter,
}

impl DeploymentWriter {
    pub fn new(settings: WriterSettings) -> Self {
        Self {
            writer: TfWriter::new(settings),
        }
    }

    /// Write all groups of `config` under `deployment_dir`.
    ///
    /// An existing directory is only reused with `overwrite`; its group
    /// directories are archived first and their Terraform state is carried
    /// into the new groups once every group is written. An overwrite that
    /// drops a group still holding state fails before anything is moved.
    pub fn write_deployment(
        &self,
        config: &DeploymentConfig,
        deployment_dir: &Path,
        overwrite: bool,
        sink: &mut dyn Write,
    ) -> TfResult<DeploymentMetadata> {
        let validation = ConfigValidator::validate(config);
        for warning in &validation.warnings {
            warn!("{}", warning);
        }
        if !validation.is_valid() {
            return Err(TfError::InvalidConfig(validation.errors.join("; ")));
        }

        self.prepare_dir(config, deployment_dir, overwrite)?;

        let mut groups = Vec::with_capacity(config.deployment_groups.len());
        for index in 0..config.deployment_groups.len() {
            let metadata = self
                .writer
                .write_deployment_group(config, index, deployment_dir, sink)?;
            groups.push(metadata);
        }

        StateCarrier::carry(&previous_groups_path(deployment_dir), deployment_dir)?;

        let metadata = DeploymentMetadata {
            blueprint_name: config.blueprint_name.clone(),
            deployment_groups: groups,
        };
        fs::write(metadata_path(deployment_dir), serde_yaml::to_string(&metadata)?)?;

        info!(
            "Wrote {} deployment groups of {} to {:?}",
            metadata.deployment_groups.len(),
            config.blueprint_name,
            deployment_dir
        );
        Ok(metadata)
    }

    fn prepare_dir(&self, config: &DeploymentConfig, deployment_dir: &Path, overwrite: bool) -> TfResult<()> {
        if deployment_dir.exists() {
            if !overwrite {
                return Err(TfError::DeploymentExists(deployment_dir.to_path_buf()));
            }
            let groups: BTreeSet<&str> = config.deployment_groups.iter().map(|g| g.name.as_str()).collect();
            StateCarrier::check_orphans(deployment_dir, &groups)?;
            StateCarrier::check_orphans(&previous_groups_path(deployment_dir), &groups)?;
            Self::archive_groups(deployment_dir)?;
        }

        fs::create_dir_all(deployment_dir.join(HIDDEN_DIR))?;
        for group in &config.deployment_groups {
            let group_dir = deployment_dir.join(&group.name);
            if group_dir.exists() {
                fs::remove_dir_all(&group_dir)?;
            }
            fs::create_dir_all(&group_dir)?;
            debug!("Created group directory {:?}", group_dir);
        }
        Ok(())
    }

    /// Move every non-hidden directory of `deployment_dir` into a fresh
    /// archive.
    fn archive_groups(deployment_dir: &Path) -> TfResult<()> {
        let archive = previous_groups_path(deployment_dir);
        if archive.exists() {
            fs::remove_dir_all(&archive)?;
        }
        fs::create_dir_all(&archive)?;

        let mut group_dirs = Vec::new();
        for entry in WalkDir::new(deployment_dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| TfError::Archive {
                path: deployment_dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if entry.file_type().is_dir() && !hidden {
                group_dirs.push(entry.into_path());
            }
        }

        let options = CopyOptions::new();
        for dir in &group_dirs {
            fs_extra::dir::move_dir(dir, &archive, &options).map_err(|e| TfError::Archive {
                path: dir.clone(),
                message: e.to_string(),
            })?;
            debug!("Archived {:?}", dir);
        }

        if !group_dirs.is_empty() {
            info!("Archived {} previous deployment groups to {:?}", group_dirs.len(), archive);
        }
        Ok(())
    }
}

impl Default for DeploymentWriter {
    fn default() -> Self {
        Self::new(WriterSettings::default())
    }
}
