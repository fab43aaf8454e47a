//! Structural checks on a resolved deployment.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ModelError, ModelResult};
use crate::models::{automatic_output_name, DeploymentConfig};

/// Problems found in a deployment config. Errors block writing; warnings
/// are only reported.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn extend(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// The warnings when there are no errors, otherwise every error joined
    /// into one `ValidationFailed`.
    pub fn into_result(self) -> ModelResult<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(ModelError::ValidationFailed(self.errors.join("; ")))
        }
    }
}

/// Validator for deployment configs.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run every check.
    pub fn validate(config: &DeploymentConfig) -> ValidationReport {
        let mut report = ValidationReport::default();

        if config.blueprint_name.is_empty() {
            report.warning("Blueprint name is empty");
        }

        report.extend(Self::validate_groups(config));
        report.extend(Self::validate_modules(config));
        report.extend(Self::validate_connections(config));

        report
    }

    /// Group names must be unique and usable as directory names.
    pub fn validate_groups(config: &DeploymentConfig) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut seen = BTreeSet::new();

        for group in &config.deployment_groups {
            if group.name.is_empty() {
                report.error("Deployment group name cannot be empty");
                continue;
            }
            if group.name.starts_with('.') || group.name.contains(['/', '\\']) {
                report.error(format!(
                    "Deployment group name '{}' is not a valid directory name",
                    group.name
                ));
            }
            if !seen.insert(group.name.as_str()) {
                report.error(format!("Duplicate deployment group name '{}'", group.name));
            }
            if group.modules.is_empty() {
                report.warning(format!("Deployment group '{}' has no modules", group.name));
            }
        }

        report
    }

    /// Module ids must be unique blueprint-wide and every module needs a
    /// source. Automatic output names must be unique blueprint-wide too,
    /// since a later group may read outputs of several earlier groups.
    pub fn validate_modules(config: &DeploymentConfig) -> ValidationReport {
        let mut report = ValidationReport::default();
        let mut seen = BTreeSet::new();
        let mut producers: BTreeMap<String, &str> = BTreeMap::new();

        for group in &config.deployment_groups {
            for module in &group.modules {
                if module.id.is_empty() {
                    report.error(format!("Module in group '{}' has an empty id", group.name));
                    continue;
                }
                if !seen.insert(module.id.as_str()) {
                    report.error(format!("Duplicate module id '{}'", module.id));
                }
                if module.source.is_empty() {
                    report.error(format!("Module '{}' has no source", module.id));
                }

                for setting in module.wrap_settings_with.keys() {
                    if !module.settings.contains_key(setting) {
                        report.warning(format!(
                            "Module '{}' wraps unknown setting '{}'",
                            module.id, setting
                        ));
                    }
                }

                for output in &module.outputs {
                    let name = automatic_output_name(&module.id, &output.name);
                    if let Some(first) = producers.insert(name.clone(), module.id.as_str()) {
                        report.error(format!(
                            "Output name '{}' is produced by both module '{}' and module '{}'",
                            name, first, module.id
                        ));
                    }
                }
            }
        }

        report
    }

    /// Connections should refer to modules that exist.
    pub fn validate_connections(config: &DeploymentConfig) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (consumer, connections) in &config.connections {
            if config.module(consumer).is_none() {
                report.warning(format!("Connections recorded for unknown module '{}'", consumer));
            }
            for conn in connections {
                if let Some(source) = &conn.source_module {
                    if config.module(source).is_none() {
                        report.error(format!(
                            "Module '{}' is connected to unknown module '{}'",
                            consumer, source
                        ));
                    }
                }
            }
        }

        report
    }
}
