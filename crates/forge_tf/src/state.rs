//! Carry Terraform state from a previous write into the new group directories.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{TfError, TfResult};

pub const TF_STATE_FILE: &str = "terraform.tfstate";
pub const TF_STATE_BACKUP_FILE: &str = "terraform.tfstate.backup";

/// State files copied for every group.
pub const STATE_FILES: [&str; 2] = [TF_STATE_FILE, TF_STATE_BACKUP_FILE];

/// Copies state files verbatim. State is opaque here: no merging, no locking.
pub struct StateCarrier;

impl StateCarrier {
    /// Copy the state files of every group directory under `prior_dir` into
    /// the directory of the same name under `new_dir`. Returns the paths
    /// written.
    ///
    /// A prior group holding state with no directory under `new_dir` fails
    /// with `OrphanedState`; the next overwrite would discard that state.
    pub fn carry(prior_dir: &Path, new_dir: &Path) -> TfResult<Vec<PathBuf>> {
        let mut copied = Vec::new();

        if !prior_dir.exists() {
            debug!("No previous deployment groups at {:?}", prior_dir);
            return Ok(copied);
        }

        for entry in WalkDir::new(prior_dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| TfError::PreviousGroups {
                path: prior_dir.to_path_buf(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }

            let group = entry.file_name();
            let dest_dir = new_dir.join(group);
            if !dest_dir.is_dir() {
                if has_state(entry.path()) {
                    return Err(TfError::OrphanedState {
                        group: group.to_string_lossy().into_owned(),
                        path: entry.path().to_path_buf(),
                    });
                }
                warn!(
                    "Previous deployment group {:?} is not part of this deployment, skipping it",
                    group
                );
                continue;
            }

            for state_file in STATE_FILES {
                let src = entry.path().join(state_file);
                if !src.is_file() {
                    continue;
                }
                let dest = dest_dir.join(state_file);
                Self::copy_state_file(&src, &dest)?;
                copied.push(dest);
            }
        }

        if !copied.is_empty() {
            info!("Restored {} state files from {:?}", copied.len(), prior_dir);
        }
        Ok(copied)
    }

    /// Names of the non-hidden group directories under `dir` holding at least
    /// one state file, sorted. A missing `dir` has none.
    pub fn groups_with_state(dir: &Path) -> TfResult<Vec<String>> {
        let mut groups = Vec::new();
        if !dir.exists() {
            return Ok(groups);
        }

        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| TfError::PreviousGroups {
                path: dir.to_path_buf(),
                message: e.to_string(),
            })?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() && !name.starts_with('.') && has_state(entry.path()) {
                groups.push(name.into_owned());
            }
        }
        Ok(groups)
    }

    /// Fail if a group directory under `dir` holds state but is not one of
    /// `groups`.
    pub fn check_orphans(dir: &Path, groups: &BTreeSet<&str>) -> TfResult<()> {
        match Self::groups_with_state(dir)?
            .into_iter()
            .find(|name| !groups.contains(name.as_str()))
        {
            Some(group) => Err(TfError::OrphanedState {
                path: dir.join(&group),
                group,
            }),
            None => Ok(()),
        }
    }

    fn copy_state_file(src: &Path, dest: &Path) -> TfResult<()> {
        let bytes = fs::read(src).map_err(|error| TfError::ReadState {
            path: src.to_path_buf(),
            error,
        })?;
        fs::write(dest, &bytes).map_err(|error| TfError::WriteState {
            path: dest.to_path_buf(),
            error,
        })?;
        debug!("Copied {:?} to {:?}", src, dest);
        Ok(())
    }
}

fn has_state(group_dir: &Path) -> bool {
    STATE_FILES.iter().any(|file| group_dir.join(file).is_file())
}
