//! Writing one deployment group.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use forge_model::DeploymentConfig;

use crate::emit::{
    TfEmitter, MAIN_FILE, OUTPUTS_FILE, PROVIDERS_FILE, TFVARS_FILE, VARIABLES_FILE, VERSIONS_FILE,
};
use crate::error::{TfError, TfResult};
use crate::settings::WriterSettings;
use crate::terraform::GroupInstructions;
use crate::variables::VariableFlow;

/// What a written group consumes and produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMetadata {
    pub name: String,
    /// Every variable the group declares, sorted.
    pub deployment_inputs: Vec<String>,
    /// Declared variables fed by other groups' outputs, sorted.
    pub intergroup_inputs: Vec<String>,
    /// Group-level outputs, sorted.
    pub outputs: Vec<String>,
}

/// Terraform writer for deployment groups.
pub struct TfWriter {
    settings: WriterSettings,
}

impl TfWriter {
    pub fn new(settings: WriterSettings) -> Self {
        Self { settings }
    }

    /// Resolve a group's metadata without writing anything.
    pub fn group_metadata(&self, config: &DeploymentConfig, group_index: usize) -> TfResult<GroupMetadata> {
        let group = group_at(config, group_index)?;
        let flow = VariableFlow::resolve(config, group)?;

        let mut outputs: Vec<String> = group
            .modules
            .iter()
            .flat_map(|m| {
                m.outputs
                    .iter()
                    .map(move |o| forge_model::automatic_output_name(&m.id, &o.name))
            })
            .collect();
        outputs.sort();
        outputs.dedup();

        Ok(GroupMetadata {
            name: group.name.clone(),
            deployment_inputs: flow.deployment_inputs(),
            intergroup_inputs: flow.intergroup_inputs(),
            outputs,
        })
    }

    /// Write the six files of group `group_index` into
    /// `<deployment_dir>/<group name>`, which must already exist and be empty.
    ///
    /// Stops at the first failing file; files already written are left in
    /// place. On success the operator instructions go to `sink`.
    pub fn write_deployment_group(
        &self,
        config: &DeploymentConfig,
        group_index: usize,
        deployment_dir: &Path,
        sink: &mut dyn Write,
    ) -> TfResult<GroupMetadata> {
        let group = group_at(config, group_index)?;
        let name = group.name.as_str();
        let flow = VariableFlow::resolve(config, group).map_err(|e| e.in_group(name, VARIABLES_FILE))?;
        let dir = deployment_dir.join(&group.name);
        let emitter = TfEmitter::new(&self.settings);

        emitter
            .write_main(&group.modules, &group.terraform_backend, &dir)
            .map_err(|e| e.in_group(name, MAIN_FILE))?;

        emitter
            .write_variables(&flow.declarations(), &dir)
            .map_err(|e| e.in_group(name, VARIABLES_FILE))?;

        let mut outputs = emitter
            .write_outputs(&group.modules, &dir)
            .map_err(|e| e.in_group(name, OUTPUTS_FILE))?;
        outputs.sort();

        emitter
            .write_tfvars(&flow.deployment_vars, &dir)
            .map_err(|e| e.in_group(name, TFVARS_FILE))?;

        emitter
            .write_providers(&flow.deployment_vars, &dir)
            .map_err(|e| e.in_group(name, PROVIDERS_FILE))?;

        emitter
            .write_versions(&dir)
            .map_err(|e| e.in_group(name, VERSIONS_FILE))?;

        info!("Wrote deployment group {} to {:?}", name, dir);

        let metadata = GroupMetadata {
            name: group.name.clone(),
            deployment_inputs: flow.deployment_inputs(),
            intergroup_inputs: flow.intergroup_inputs(),
            outputs,
        };

        if self.settings.print_instructions {
            let instructions = GroupInstructions::new(name, &dir, metadata.intergroup_inputs.clone());
            write!(sink, "{}", instructions)?;
        }

        Ok(metadata)
    }
}

impl Default for TfWriter {
    fn default() -> Self {
        Self::new(WriterSettings::default())
    }
}

fn group_at(config: &DeploymentConfig, index: usize) -> TfResult<&forge_model::DeploymentGroup> {
    config.deployment_groups.get(index).ok_or(TfError::GroupIndex {
        index,
        count: config.deployment_groups.len(),
    })
}
