//! Writer settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TfResult;

/// Banner written at the top of every generated file.
pub const DEFAULT_HEADER: &str = "\
# Generated by blueprint-forge. Do not edit this file directly;
# change the blueprint and write the deployment again.
";

/// Settings controlling how files are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterSettings {
    /// Header text placed before the generated blocks.
    pub header: String,
    /// Align attribute `=` signs like `terraform fmt`.
    pub format: bool,
    /// Print the terraform commands for each written group.
    pub print_instructions: bool,
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            header: DEFAULT_HEADER.to_string(),
            format: true,
            print_instructions: true,
        }
    }
}

impl WriterSettings {
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn with_format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    pub fn quiet(mut self) -> Self {
        self.print_instructions = false;
        self
    }

    /// Load settings from a YAML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> TfResult<Self> {
        let content = fs::read_to_string(path)?;
        let settings: WriterSettings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Header text terminated by a blank line, or nothing when empty.
    pub fn header_block(&self) -> String {
        if self.header.is_empty() {
            return String::new();
        }
        let mut header = self.header.clone();
        if !header.ends_with('\n') {
            header.push('\n');
        }
        header.push('\n');
        header
    }
}
