//! # forge_tf
//!
//! Terraform writer for resolved deployments.
//!
//! Every deployment group becomes a standalone Terraform root module: a
//! directory holding `main.tf`, `variables.tf`, `outputs.tf`,
//! `terraform.tfvars`, `providers.tf` and `versions.tf`. Groups are applied
//! one after another, so values produced by one group reach later groups as
//! input variables.
//!
//! ## Features
//!
//! - Deterministic output: keys are emitted in sorted order and two writes of
//!   the same config are byte-identical
//! - Variable flow: each group declares only the blueprint variables its
//!   modules are connected to, plus one variable per output it reads from
//!   another group
//! - Wrapped settings: `prefix(...)suffix` around list-valued settings
//! - State carry-over: Terraform state of an overwritten deployment is copied
//!   into the regenerated group directories
//!
//! ## Example
//!
//! ```rust,no_run
//! use forge_model::DeploymentConfig;
//! use forge_tf::{DeploymentWriter, WriterSettings};
//! use std::path::Path;
//!
//! let config = DeploymentConfig::from_file("deployment.yaml").unwrap();
//! let writer = DeploymentWriter::new(WriterSettings::default());
//!
//! let metadata = writer
//!     .write_deployment(&config, Path::new("./my-deployment"), false, &mut std::io::stdout())
//!     .unwrap();
//! for group in &metadata.deployment_groups {
//!     println!("{}: {:?}", group.name, group.outputs);
//! }
//! ```

pub mod body;
pub mod deployment;
pub mod emit;
pub mod error;
pub mod render;
pub mod settings;
pub mod state;
pub mod terraform;
pub mod variables;
pub mod writer;

pub use deployment::{DeploymentMetadata, DeploymentWriter, HIDDEN_DIR, METADATA_FILE, PREVIOUS_GROUPS_DIR};
pub use emit::{TfEmitter, MAIN_FILE, OUTPUTS_FILE, PROVIDERS_FILE, TFVARS_FILE, VARIABLES_FILE, VERSIONS_FILE};
pub use error::{RenderError, TfError, TfResult};
pub use render::render;
pub use settings::{WriterSettings, DEFAULT_HEADER};
pub use state::{StateCarrier, TF_STATE_BACKUP_FILE, TF_STATE_FILE};
pub use terraform::{GroupInstructions, TerraformCommand};
pub use variables::{VarInfo, VariableFlow};
pub use writer::{GroupMetadata, TfWriter};
