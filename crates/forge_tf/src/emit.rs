//! Per-file Terraform emitters.
//!
//! Every file is created with the configured header, then the generated body
//! is appended once. Targets are expected not to exist yet.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use forge_model::{automatic_output_name, Module, Reference, TerraformBackend, TypedValue};

use crate::error::{TfError, TfResult};
use crate::body::Body;
use crate::render::{quote_string, render, tokens_for_value};
use crate::settings::WriterSettings;
use crate::variables::VarInfo;

pub const MAIN_FILE: &str = "main.tf";
pub const VARIABLES_FILE: &str = "variables.tf";
pub const OUTPUTS_FILE: &str = "outputs.tf";
pub const TFVARS_FILE: &str = "terraform.tfvars";
pub const PROVIDERS_FILE: &str = "providers.tf";
pub const VERSIONS_FILE: &str = "versions.tf";

/// Providers configured in every group.
pub const PROVIDERS: [&str; 2] = ["google", "google-beta"];

/// Provider attribute -> deployment variable it reads.
const PROVIDER_ATTRIBUTES: [(&str, &str); 3] = [
    ("project", "project_id"),
    ("zone", "zone"),
    ("region", "region"),
];

const VERSIONS: &str = r#"terraform {
  required_version = ">= 1.2"

  required_providers {
    google = {
      source  = "hashicorp/google"
      version = "~> 5.0"
    }
    google-beta = {
      source  = "hashicorp/google-beta"
      version = "~> 5.0"
    }
  }
}
"#;

/// Writes the files of one deployment group.
pub struct TfEmitter<'a> {
    settings: &'a WriterSettings,
}

impl<'a> TfEmitter<'a> {
    pub fn new(settings: &'a WriterSettings) -> Self {
        Self { settings }
    }

    /// Write `main.tf`: the optional backend, then one block per module.
    /// Returns the number of module blocks written.
    pub fn write_main(&self, modules: &[Module], backend: &TerraformBackend, dir: &Path) -> TfResult<usize> {
        let path = dir.join(MAIN_FILE);
        self.create_base_file(&path)?;

        let mut body = Body::new();

        if backend.is_configured() {
            let backend_body = body
                .append_plain_block("terraform")
                .append_block("backend", [backend.backend_type.as_str()]);
            for (name, value) in &backend.configuration {
                backend_body.set_attribute_raw(name.as_str(), tokens_for_value(value));
            }
            body.append_newline();
        }

        for (idx, module) in modules.iter().enumerate() {
            if idx > 0 {
                body.append_newline();
            }
            Self::append_module(&mut body, module)?;
        }

        self.append_to_file(&path, &body)?;
        Ok(modules.len())
    }

    fn append_module(body: &mut Body, module: &Module) -> TfResult<()> {
        let module_body = body.append_block("module", [module.id.as_str()]);
        module_body.set_attribute_raw("source", quote_string(&module.source));

        for (setting, value) in &module.settings {
            let wrap = module.wrap_settings_with.get(setting).map(Vec::as_slice);
            let tokens = render(value, wrap).map_err(|error| TfError::Setting {
                module: module.id.clone(),
                setting: setting.clone(),
                error,
            })?;
            module_body.set_attribute_raw(setting.as_str(), tokens);
        }

        debug!("Added module {} with {} settings", module.id, module.settings.len());
        Ok(())
    }

    /// Write `variables.tf` from already sorted declarations.
    pub fn write_variables(&self, declarations: &[VarInfo], dir: &Path) -> TfResult<()> {
        let path = dir.join(VARIABLES_FILE);
        self.create_base_file(&path)?;

        let mut body = Body::new();
        for (idx, var) in declarations.iter().enumerate() {
            if idx > 0 {
                body.append_newline();
            }
            let var_body = body.append_block("variable", [var.name.as_str()]);
            var_body.set_attribute_raw("description", quote_string(&var.description));
            var_body.set_attribute_raw("type", var.tf_type.as_str());
        }

        self.append_to_file(&path, &body)
    }

    /// Write `outputs.tf`, exposing every module output under its automatic
    /// name. Returns the output names in the order written.
    pub fn write_outputs(&self, modules: &[Module], dir: &Path) -> TfResult<Vec<String>> {
        let path = dir.join(OUTPUTS_FILE);
        self.create_base_file(&path)?;

        let mut body = Body::new();
        let mut producers: BTreeMap<String, &str> = BTreeMap::new();
        let mut names = Vec::new();

        for module in modules {
            for output in &module.outputs {
                let name = automatic_output_name(&module.id, &output.name);
                if let Some(first) = producers.insert(name.clone(), module.id.as_str()) {
                    return Err(TfError::DuplicateOutput {
                        name,
                        first: first.to_string(),
                        second: module.id.clone(),
                    });
                }

                if !names.is_empty() {
                    body.append_newline();
                }
                let output_body = body.append_block("output", [name.as_str()]);

                let description = if output.description.is_empty() {
                    format!("Generated output from module '{}'", module.id)
                } else {
                    output.description.clone()
                };
                output_body.set_attribute_raw("description", quote_string(&description));
                output_body.set_attribute_raw(
                    "value",
                    Reference::module_output(&module.id, &output.name).to_string(),
                );
                if output.sensitive {
                    output_body.set_attribute_raw("sensitive", "true");
                }

                names.push(name);
            }
        }

        self.append_to_file(&path, &body)?;
        Ok(names)
    }

    /// Write `terraform.tfvars` with the values of the group's deployment
    /// variables.
    pub fn write_tfvars(&self, vars: &BTreeMap<String, TypedValue>, dir: &Path) -> TfResult<()> {
        let path = dir.join(TFVARS_FILE);
        self.create_base_file(&path)?;

        let mut body = Body::new();
        for (name, value) in vars {
            body.set_attribute_raw(name.as_str(), tokens_for_value(value));
        }

        self.append_to_file(&path, &body)
    }

    /// Write `providers.tf`. Provider attributes reference deployment
    /// variables and are only set when the group declares them.
    pub fn write_providers(&self, vars: &BTreeMap<String, TypedValue>, dir: &Path) -> TfResult<()> {
        let path = dir.join(PROVIDERS_FILE);
        self.create_base_file(&path)?;

        let mut body = Body::new();
        for (idx, provider) in PROVIDERS.iter().enumerate() {
            if idx > 0 {
                body.append_newline();
            }
            let provider_body = body.append_block("provider", [*provider]);
            for (attribute, var) in PROVIDER_ATTRIBUTES {
                if vars.contains_key(var) {
                    provider_body.set_attribute_raw(attribute, Reference::variable(var).to_string());
                }
            }
        }

        self.append_to_file(&path, &body)
    }

    /// Write the fixed `versions.tf`.
    pub fn write_versions(&self, dir: &Path) -> TfResult<()> {
        let path = dir.join(VERSIONS_FILE);
        self.create_base_file(&path)?;
        append_bytes(&path, VERSIONS.as_bytes())
    }

    /// Create a file holding only the header.
    fn create_base_file(&self, path: &Path) -> TfResult<()> {
        fs::write(path, self.settings.header_block()).map_err(|error| TfError::CreateFile {
            path: path.to_path_buf(),
            error,
        })
    }

    fn append_to_file(&self, path: &Path, body: &Body) -> TfResult<()> {
        let text = body.to_hcl(self.settings.format);
        append_bytes(path, text.as_bytes())
    }
}

fn append_bytes(path: &Path, bytes: &[u8]) -> TfResult<()> {
    let write_error = |error| TfError::WriteFile {
        path: PathBuf::from(path),
        error,
    };
    let mut file = OpenOptions::new().append(true).open(path).map_err(write_error)?;
    file.write_all(bytes).map_err(write_error)?;
    debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_model::OutputInfo;
    use tempfile::tempdir;

    fn settings() -> WriterSettings {
        WriterSettings::default().with_header("# header")
    }

    fn read(dir: &Path, file: &str) -> String {
        fs::read_to_string(dir.join(file)).unwrap()
    }

    #[test]
    fn test_main_with_backend_and_modules() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        let modules = vec![
            Module::new("network", "./modules/network")
                .with_setting("project_id", TypedValue::var("project_id"))
                .with_setting("auto_create", TypedValue::bool(true)),
            Module::new("compute", "./modules/vm").with_setting("count", TypedValue::number(2)),
        ];
        let backend = TerraformBackend::new("gcs")
            .with_setting("prefix", TypedValue::string("bp/g1"))
            .with_setting("bucket", TypedValue::string("state"));

        let count = emitter.write_main(&modules, &backend, dir.path()).unwrap();
        assert_eq!(count, 2);

        let expected = r#"# header

terraform {
  backend "gcs" {
    bucket = "state"
    prefix = "bp/g1"
  }
}

module "network" {
  source      = "./modules/network"
  auto_create = true
  project_id  = var.project_id
}

module "compute" {
  source = "./modules/vm"
  count  = 2
}
"#;
        assert_eq!(read(dir.path(), MAIN_FILE), expected);
    }

    #[test]
    fn test_main_without_backend() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        emitter
            .write_main(&[Module::new("a", "./a")], &TerraformBackend::default(), dir.path())
            .unwrap();
        assert_eq!(
            read(dir.path(), MAIN_FILE),
            "# header\n\nmodule \"a\" {\n  source = \"./a\"\n}\n"
        );
    }

    #[test]
    fn test_main_bad_wrap_names_setting() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        let module = Module::new("vm", "./vm")
            .with_setting("zone", TypedValue::string("z"))
            .with_wrap("zone", "f(", ")");

        let err = emitter
            .write_main(&[module], &TerraformBackend::default(), dir.path())
            .unwrap_err();
        match err {
            TfError::Setting { module, setting, .. } => {
                assert_eq!(module, "vm");
                assert_eq!(setting, "zone");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(read(dir.path(), MAIN_FILE), "# header\n\n");
    }

    #[test]
    fn test_variables() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        let decls = vec![
            VarInfo::for_deployment_var("labels", &TypedValue::object([("a", TypedValue::string("b"))])),
            VarInfo::for_deployment_var("zone", &TypedValue::string("z")),
        ];
        emitter.write_variables(&decls, dir.path()).unwrap();

        let expected = r#"# header

variable "labels" {
  description = "Toolkit deployment variable: labels"
  type        = any
}

variable "zone" {
  description = "Toolkit deployment variable: zone"
  type        = string
}
"#;
        assert_eq!(read(dir.path(), VARIABLES_FILE), expected);
    }

    #[test]
    fn test_outputs() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        let modules = vec![Module::new("network", "./net")
            .with_output(OutputInfo::new("network_id"))
            .with_output(OutputInfo::new("secret").with_description("A secret").sensitive())];

        let names = emitter.write_outputs(&modules, dir.path()).unwrap();
        assert_eq!(names, vec!["network_network_id", "network_secret"]);

        let expected = r#"# header

output "network_network_id" {
  description = "Generated output from module 'network'"
  value       = module.network.network_id
}

output "network_secret" {
  description = "A secret"
  value       = module.network.secret
  sensitive   = true
}
"#;
        assert_eq!(read(dir.path(), OUTPUTS_FILE), expected);
    }

    #[test]
    fn test_outputs_collision() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        let modules = vec![
            Module::new("a_b", "./m").with_output(OutputInfo::new("c")),
            Module::new("a", "./m").with_output(OutputInfo::new("b_c")),
        ];
        let err = emitter.write_outputs(&modules, dir.path()).unwrap_err();
        assert!(matches!(err, TfError::DuplicateOutput { ref name, .. } if name == "a_b_c"));
    }

    #[test]
    fn test_tfvars() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        let vars = BTreeMap::from([
            ("zone".to_string(), TypedValue::string("us-central1-a")),
            ("labels".to_string(), TypedValue::object([("env", TypedValue::string("dev"))])),
            ("node_count".to_string(), TypedValue::number(3)),
        ]);
        emitter.write_tfvars(&vars, dir.path()).unwrap();

        assert_eq!(
            read(dir.path(), TFVARS_FILE),
            "# header\n\nlabels     = { env = \"dev\" }\nnode_count = 3\nzone       = \"us-central1-a\"\n"
        );
    }

    #[test]
    fn test_providers_reference_declared_vars_only() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        let vars = BTreeMap::from([
            ("project_id".to_string(), TypedValue::string("p")),
            ("region".to_string(), TypedValue::string("r")),
        ]);
        emitter.write_providers(&vars, dir.path()).unwrap();

        let expected = r#"# header

provider "google" {
  project = var.project_id
  region  = var.region
}

provider "google-beta" {
  project = var.project_id
  region  = var.region
}
"#;
        assert_eq!(read(dir.path(), PROVIDERS_FILE), expected);
    }

    #[test]
    fn test_versions() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        emitter.write_versions(dir.path()).unwrap();
        let content = read(dir.path(), VERSIONS_FILE);
        assert!(content.starts_with("# header\n\nterraform {\n"));
        assert!(content.contains("hashicorp/google-beta"));
    }

    #[test]
    fn test_create_fails_for_missing_dir() {
        let dir = tempdir().unwrap();
        let settings = settings();
        let emitter = TfEmitter::new(&settings);

        let missing = dir.path().join("nope");
        let err = emitter.write_versions(&missing).unwrap_err();
        match err {
            TfError::CreateFile { path, .. } => assert_eq!(path, missing.join(VERSIONS_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
