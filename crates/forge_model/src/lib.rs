//! # forge_model
//!
//! The resolved deployment that the Terraform writer consumes.
//!
//! A deployment is a list of deployment groups, each holding an ordered list
//! of configured modules, plus a graph of connections recording which values
//! flow between modules and whether they cross a deployment boundary.
//!
//! ## Features
//!
//! - **Typed values**: settings and variables carry their shape, so both a
//!   literal and a declared type can be derived from them
//! - **References**: `var.*` and `module.*.*` references are explicit values,
//!   recognized from upstream `((...))` markers at load time
//! - **Loading**: YAML input with the implicit `labels` variable filled in
//! - **Validation**: unique group names, module ids and output names, known
//!   connections
//!
//! ## Example
//!
//! ```rust,no_run
//! use forge_model::{ConfigValidator, DeploymentConfig};
//!
//! let config = DeploymentConfig::from_file("deployment.yaml").unwrap();
//! let report = ConfigValidator::validate(&config);
//! if !report.is_valid() {
//!     for error in &report.errors {
//!         eprintln!("Error: {}", error);
//!     }
//! }
//! ```

pub mod error;
pub mod models;
pub mod reader;
pub mod validator;
pub mod value;

pub use error::{ModelError, ModelResult};
pub use models::*;
pub use reader::ConfigReader;
pub use validator::{ConfigValidator, ValidationReport};
pub use value::{Primitive, Reference, TypedValue};
