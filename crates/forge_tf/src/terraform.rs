//! Terraform commands an operator runs against a written group.

use std::fmt;
use std::path::{Path, PathBuf};

/// Terraform subcommands, in the order they must be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerraformCommand {
    Init,
    Validate,
    Apply,
}

impl TerraformCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerraformCommand::Init => "init",
            TerraformCommand::Validate => "validate",
            TerraformCommand::Apply => "apply",
        }
    }

    pub fn all() -> [Self; 3] {
        [TerraformCommand::Init, TerraformCommand::Validate, TerraformCommand::Apply]
    }

    /// Full command line for a group directory.
    pub fn command_line(&self, group_dir: &Path) -> String {
        format!("terraform -chdir={} {}", group_dir.display(), self.as_str())
    }
}

/// Instructions printed after a group is written.
#[derive(Debug, Clone)]
pub struct GroupInstructions {
    pub group: String,
    pub group_dir: PathBuf,
    /// Inputs that must come from groups applied earlier.
    pub intergroup_inputs: Vec<String>,
}

impl GroupInstructions {
    pub fn new(group: impl Into<String>, group_dir: impl Into<PathBuf>, intergroup_inputs: Vec<String>) -> Self {
        Self {
            group: group.into(),
            group_dir: group_dir.into(),
            intergroup_inputs,
        }
    }
}

impl fmt::Display for GroupInstructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Terraform group '{}' was successfully created in directory {}",
            self.group,
            self.group_dir.display()
        )?;
        writeln!(f, "To deploy, run the following commands:")?;
        writeln!(f)?;

        if !self.intergroup_inputs.is_empty() {
            writeln!(
                f,
                "WARNING: this group reads outputs of other deployment groups ({}).",
                self.intergroup_inputs.join(", ")
            )?;
            writeln!(
                f,
                "Apply the groups producing them first and pass their outputs as input variables."
            )?;
            writeln!(f)?;
        }

        for command in TerraformCommand::all() {
            writeln!(f, "  {}", command.command_line(&self.group_dir))?;
        }
        writeln!(f)
    }
}
