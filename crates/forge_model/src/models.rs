//! Data models for a resolved deployment.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::value::TypedValue;

/// Global variable that every module receives implicitly.
pub const LABELS_VAR: &str = "labels";

/// Name of the group-level output (and downstream variable) exposing a module
/// output. Module ids are unique blueprint-wide, so the name is stable.
pub fn automatic_output_name(module_id: &str, output_name: &str) -> String {
    format!("{}_{}", module_id, output_name)
}

/// How a connection couples two endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    /// Values cross a deployment boundary and must be declared as variables.
    Deployment,
    /// Direct use inside the same group; no variable is involved.
    Use,
}

/// An edge of the module connection graph, stored under the consuming module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModuleConnection {
    /// Producing module; `None` when the values come from the deployment
    /// variables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_module: Option<String>,
    pub kind: ConnectionKind,
    #[serde(default)]
    pub shared_variables: BTreeSet<String>,
}

impl ModuleConnection {
    /// Connection from the deployment variables.
    pub fn from_vars<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_module: None,
            kind: ConnectionKind::Deployment,
            shared_variables: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Deployment-boundary connection from another module's outputs.
    pub fn from_module<I, S>(module_id: impl Into<String>, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_module: Some(module_id.into()),
            kind: ConnectionKind::Deployment,
            shared_variables: outputs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_kind(mut self, kind: ConnectionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_deployment_kind(&self) -> bool {
        self.kind == ConnectionKind::Deployment
    }
}

/// A declared module output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sensitive: bool,
}

impl OutputInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            sensitive: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// A configured module.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Module {
    pub id: String,
    /// Deployment source locator written as the module `source`.
    pub source: String,
    #[serde(default)]
    pub settings: BTreeMap<String, TypedValue>,
    #[serde(default)]
    pub outputs: Vec<OutputInfo>,
    /// Setting name -> `[prefix, suffix]` wrapped around a list setting.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub wrap_settings_with: BTreeMap<String, Vec<String>>,
}

impl Module {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            settings: BTreeMap::new(),
            outputs: Vec::new(),
            wrap_settings_with: BTreeMap::new(),
        }
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.settings.insert(name.into(), value);
        self
    }

    pub fn with_output(mut self, output: OutputInfo) -> Self {
        self.outputs.push(output);
        self
    }

    pub fn with_wrap(
        mut self,
        setting: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        self.wrap_settings_with
            .insert(setting.into(), vec![prefix.into(), suffix.into()]);
        self
    }

    /// Find a declared output by name.
    pub fn output(&self, name: &str) -> Option<&OutputInfo> {
        self.outputs.iter().find(|o| o.name == name)
    }
}

/// Terraform backend for a deployment group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TerraformBackend {
    /// Backend type (e.g. "gcs"); empty means local state.
    #[serde(rename = "type", default)]
    pub backend_type: String,
    #[serde(default)]
    pub configuration: BTreeMap<String, TypedValue>,
}

impl TerraformBackend {
    pub fn new(backend_type: impl Into<String>) -> Self {
        Self {
            backend_type: backend_type.into(),
            configuration: BTreeMap::new(),
        }
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.configuration.insert(name.into(), value);
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_type.is_empty()
    }
}

/// An independently applied set of modules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploymentGroup {
    pub name: String,
    #[serde(default)]
    pub terraform_backend: TerraformBackend,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl DeploymentGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terraform_backend: TerraformBackend::default(),
            modules: Vec::new(),
        }
    }

    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    pub fn with_backend(mut self, backend: TerraformBackend) -> Self {
        self.terraform_backend = backend;
        self
    }

    pub fn contains_module(&self, id: &str) -> bool {
        self.modules.iter().any(|m| m.id == id)
    }
}

/// A fully resolved deployment, ready to be written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeploymentConfig {
    pub blueprint_name: String,
    #[serde(default)]
    pub vars: BTreeMap<String, TypedValue>,
    #[serde(default)]
    pub deployment_groups: Vec<DeploymentGroup>,
    /// Consuming module id -> its connections.
    #[serde(default)]
    pub connections: BTreeMap<String, Vec<ModuleConnection>>,
}

impl DeploymentConfig {
    pub fn new(blueprint_name: impl Into<String>) -> Self {
        let mut config = Self {
            blueprint_name: blueprint_name.into(),
            vars: BTreeMap::new(),
            deployment_groups: Vec::new(),
            connections: BTreeMap::new(),
        };
        config.normalize();
        config
    }

    pub fn with_var(mut self, name: impl Into<String>, value: TypedValue) -> Self {
        self.vars.insert(name.into(), value);
        self
    }

    pub fn with_group(mut self, group: DeploymentGroup) -> Self {
        self.deployment_groups.push(group);
        self
    }

    pub fn with_connection(mut self, consumer: impl Into<String>, connection: ModuleConnection) -> Self {
        self.connections.entry(consumer.into()).or_default().push(connection);
        self
    }

    /// Ensure the implicit `labels` variable exists.
    pub fn normalize(&mut self) {
        self.vars
            .entry(LABELS_VAR.to_string())
            .or_insert_with(|| TypedValue::Object(BTreeMap::new()));
    }

    pub fn group(&self, name: &str) -> Option<&DeploymentGroup> {
        self.deployment_groups.iter().find(|g| g.name == name)
    }

    /// Find a module anywhere in the deployment.
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.deployment_groups
            .iter()
            .flat_map(|g| g.modules.iter())
            .find(|m| m.id == id)
    }

    /// Connections recorded for a consuming module.
    pub fn module_connections(&self, id: &str) -> &[ModuleConnection] {
        self.connections.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}
