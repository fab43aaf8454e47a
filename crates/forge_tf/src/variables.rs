//! Variable flow between deployment groups.
//!
//! Each group is applied on its own, so every value it needs from outside has
//! to be declared as a variable: blueprint-level variables reached through a
//! deployment connection, and outputs of modules in other groups
//! ("intergroup" variables).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use forge_model::{automatic_output_name, DeploymentConfig, DeploymentGroup, TypedValue, LABELS_VAR};

use crate::error::{TfError, TfResult};
use crate::render::hcl_type;

/// A variable declaration in `variables.tf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarInfo {
    /// Variable name.
    pub name: String,
    /// Description attribute.
    pub description: String,
    /// Terraform type keyword.
    pub tf_type: String,
}

impl VarInfo {
    /// Declaration for a blueprint-level variable.
    pub fn for_deployment_var(name: &str, value: &TypedValue) -> Self {
        Self {
            name: name.to_string(),
            description: format!("Toolkit deployment variable: {}", name),
            tf_type: hcl_type(value).to_string(),
        }
    }
}

/// Variables a single group must declare.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableFlow {
    /// Blueprint-level variables used by the group, with their values.
    pub deployment_vars: BTreeMap<String, TypedValue>,
    /// Outputs of modules in other groups, keyed by variable name.
    pub intergroup_vars: BTreeMap<String, VarInfo>,
}

impl VariableFlow {
    /// Resolve the variables of `group`.
    pub fn resolve(config: &DeploymentConfig, group: &DeploymentGroup) -> TfResult<Self> {
        let required = required_variable_names(config, group);
        let deployment_vars = select_vars(&config.vars, &required);
        let intergroup_vars = intergroup_variables(config, group)?;

        debug!(
            "Group {} uses {} deployment variables and {} intergroup variables",
            group.name,
            deployment_vars.len(),
            intergroup_vars.len()
        );

        Ok(Self {
            deployment_vars,
            intergroup_vars,
        })
    }

    /// Every declared variable name, sorted.
    pub fn deployment_inputs(&self) -> Vec<String> {
        self.deployment_vars
            .keys()
            .chain(self.intergroup_vars.keys())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Names of variables fed by other groups, sorted.
    pub fn intergroup_inputs(&self) -> Vec<String> {
        self.intergroup_vars.keys().cloned().collect()
    }

    /// Declarations for `variables.tf`, sorted by name.
    pub fn declarations(&self) -> Vec<VarInfo> {
        let mut merged: BTreeMap<&str, VarInfo> = self
            .deployment_vars
            .iter()
            .map(|(name, value)| (name.as_str(), VarInfo::for_deployment_var(name, value)))
            .collect();

        for (name, info) in &self.intergroup_vars {
            if merged.insert(name.as_str(), info.clone()).is_some() {
                warn!(
                    "Intergroup variable {} shadows the deployment variable of the same name",
                    name
                );
            }
        }

        merged.into_values().collect()
    }

    pub fn has_intergroup_inputs(&self) -> bool {
        !self.intergroup_vars.is_empty()
    }
}

/// Names shared into the group over deployment connections, plus `labels`.
pub fn required_variable_names(config: &DeploymentConfig, group: &DeploymentGroup) -> BTreeSet<String> {
    let mut names = BTreeSet::from([LABELS_VAR.to_string()]);

    for module in &group.modules {
        for conn in config.module_connections(&module.id) {
            if conn.is_deployment_kind() {
                names.extend(conn.shared_variables.iter().cloned());
            }
        }
    }

    names
}

/// Keep only the variables named in `required`. Names without a value are
/// dropped: a connection records possible sharing, not existence.
pub fn select_vars(
    vars: &BTreeMap<String, TypedValue>,
    required: &BTreeSet<String>,
) -> BTreeMap<String, TypedValue> {
    vars.iter()
        .filter(|(name, _)| required.contains(*name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Variables fed by module outputs of other groups.
///
/// Two different outputs may flatten to the same variable name (`a_b` + `c`
/// and `a` + `b_c`); that is an error rather than a silent merge.
pub fn intergroup_variables(
    config: &DeploymentConfig,
    group: &DeploymentGroup,
) -> TfResult<BTreeMap<String, VarInfo>> {
    let mut vars = BTreeMap::new();
    let mut producers: BTreeMap<String, &str> = BTreeMap::new();

    for module in &group.modules {
        for conn in config.module_connections(&module.id) {
            if !conn.is_deployment_kind() {
                continue;
            }
            let Some(source) = conn.source_module.as_deref() else {
                continue;
            };
            if group.contains_module(source) {
                continue;
            }

            let producer = config.module(source);
            for output in &conn.shared_variables {
                let name = automatic_output_name(source, output);
                if let Some(first) = producers.insert(name.clone(), source) {
                    if first != source {
                        return Err(TfError::DuplicateOutput {
                            name,
                            first: first.to_string(),
                            second: source.to_string(),
                        });
                    }
                    continue;
                }

                let description = producer
                    .and_then(|m| m.output(output))
                    .map(|o| o.description.clone())
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| format!("Toolkit automatically generated variable: {}", name));

                vars.insert(
                    name.clone(),
                    VarInfo {
                        name,
                        description,
                        tf_type: hcl_type(&TypedValue::Unknown).to_string(),
                    },
                );
            }
        }
    }

    Ok(vars)
}
