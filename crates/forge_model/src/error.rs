//! Error types for the deployment model.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while loading or checking a deployment.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Deployment config not found at path: {0}")]
    NotFound(PathBuf),

    #[error("Invalid deployment config in file {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    #[error("Deployment validation failed: {0}")]
    ValidationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
