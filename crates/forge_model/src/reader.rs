//! Deployment config reading utilities.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::models::DeploymentConfig;

/// Reader for resolved deployment configs.
pub struct ConfigReader;

impl ConfigReader {
    /// Read a deployment config from a YAML file.
    pub fn read_file(path: impl AsRef<Path>) -> ModelResult<DeploymentConfig> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }
        debug!("Reading deployment config from {:?}", path);

        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            ModelError::Yaml(err) => ModelError::InvalidFormat {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
            other => other,
        })
    }

    /// Parse a deployment config from YAML text.
    pub fn parse(content: &str) -> ModelResult<DeploymentConfig> {
        let mut config: DeploymentConfig = serde_yaml::from_str(content)?;
        config.normalize();
        Ok(config)
    }
}

impl DeploymentConfig {
    /// Load a deployment config from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> ModelResult<Self> {
        ConfigReader::read_file(path)
    }

    /// Load a deployment config from YAML text.
    pub fn from_yaml_str(content: &str) -> ModelResult<Self> {
        ConfigReader::parse(content)
    }

    /// Save the deployment config as YAML.
    pub fn to_file(&self, path: impl AsRef<Path>) -> ModelResult<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
