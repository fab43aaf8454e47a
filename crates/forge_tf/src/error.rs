//! Error types for the Terraform writer.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Terraform writer operations.
pub type TfResult<T> = Result<T, TfError>;

/// Errors raised while rendering a single value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("invalid value for wrapped setting, expected sequence, got {0}")]
    NotASequence(&'static str),

    #[error("invalid length of wrap directive, expected 2 got {0}")]
    InvalidWrapLength(usize),
}

/// Errors that can occur while writing deployment groups.
#[derive(Error, Debug)]
pub enum TfError {
    #[error("Failed to create {path}: {error}")]
    CreateFile { path: PathBuf, error: std::io::Error },

    #[error("Failed to write {path}: {error}")]
    WriteFile { path: PathBuf, error: std::io::Error },

    #[error("Failed to process setting {module}.{setting}: {error}")]
    Setting {
        module: String,
        setting: String,
        error: RenderError,
    },

    #[error("Output name '{name}' is produced by both module '{first}' and module '{second}'")]
    DuplicateOutput {
        name: String,
        first: String,
        second: String,
    },

    #[error("Error writing {file} for deployment group {group}: {error}")]
    Group {
        group: String,
        file: &'static str,
        error: Box<TfError>,
    },

    #[error("Failed to read previous deployment groups in {path}: {message}")]
    PreviousGroups { path: PathBuf, message: String },

    #[error("Failed to read previous state file {path}: {error}")]
    ReadState { path: PathBuf, error: std::io::Error },

    #[error("Failed to write previous state file {path}: {error}")]
    WriteState { path: PathBuf, error: std::io::Error },

    #[error(
        "Deployment group '{group}' is no longer in the blueprint but its Terraform state remains in {path}; \
         destroy or move that state before writing"
    )]
    OrphanedState { group: String, path: PathBuf },

    #[error("Failed to archive previous deployment group {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("Deployment directory already exists: {0}")]
    DeploymentExists(PathBuf),

    #[error("Invalid deployment config: {0}")]
    InvalidConfig(String),

    #[error("Deployment group index {index} out of range ({count} groups)")]
    GroupIndex { index: usize, count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TfError {
    /// Attach the group and file being written.
    pub fn in_group(self, group: impl Into<String>, file: &'static str) -> Self {
        TfError::Group {
            group: group.into(),
            file,
            error: Box::new(self),
        }
    }
}
