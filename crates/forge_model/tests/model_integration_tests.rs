//! Integration tests for the deployment model.

use std::fs;

use tempfile::tempdir;

use forge_model::{
    ConfigValidator, ConnectionKind, DeploymentConfig, DeploymentGroup, ModelError, Module,
    ModuleConnection, OutputInfo, Reference, TerraformBackend, TypedValue, LABELS_VAR,
};

fn sample_config() -> DeploymentConfig {
    DeploymentConfig::new("two-groups")
        .with_var("project_id", TypedValue::string("my-project"))
        .with_var("zone", TypedValue::string("us-central1-a"))
        .with_group(
            DeploymentGroup::new("g1")
                .with_backend(TerraformBackend::new("gcs").with_setting("bucket", TypedValue::string("tf-state")))
                .with_module(
                    Module::new("network", "modules/network/vpc")
                        .with_setting("project_id", TypedValue::var("project_id"))
                        .with_output(OutputInfo::new("network_id").with_description("The VPC id")),
                ),
        )
        .with_group(
            DeploymentGroup::new("g2").with_module(
                Module::new("compute", "modules/compute/vm")
                    .with_setting("network", TypedValue::var("network_network_id"))
                    .with_setting(
                        "tags",
                        TypedValue::sequence([TypedValue::string("a"), TypedValue::string("b")]),
                    )
                    .with_wrap("tags", "flatten([", "])"),
            ),
        )
        .with_connection("network", ModuleConnection::from_vars(["project_id"]))
        .with_connection("compute", ModuleConnection::from_module("network", ["network_id"]))
}

/// A saved config reads back unchanged.
#[test]
fn test_config_file_round_trip() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("deployment.yaml");

    let config = sample_config();
    config.to_file(&path).unwrap();

    let loaded = DeploymentConfig::from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

/// References are written as markers that upstream tools understand.
#[test]
fn test_references_saved_as_markers() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("deployment.yaml");

    sample_config().to_file(&path).unwrap();
    let content = fs::read_to_string(&path).unwrap();

    assert!(content.contains("((var.project_id))"));
    assert!(content.contains("((var.network_network_id))"));
}

/// Hand-written YAML with every supported value shape.
#[test]
fn test_load_handwritten_yaml() {
    let yaml = r#"
blueprint_name: handwritten
vars:
  labels:
    owner: ops
  enable_gpu: false
  node_count: 4
deployment_groups:
  - name: primary
    modules:
      - id: cluster
        source: ./modules/cluster
        settings:
          subnetwork: ((module.network.subnetwork_self_link))
          startup: "echo \\${HOSTNAME}"
          machine: null
          ratio: 0.5
        wrap_settings_with:
          disks: ["concat(", ")"]
        outputs:
          - name: controller_ip
            sensitive: true
connections:
  cluster:
    - kind: use
      source_module: network
      shared_variables: [subnetwork_self_link]
"#;

    let config = DeploymentConfig::from_yaml_str(yaml).unwrap();

    assert_eq!(
        config.vars.get(LABELS_VAR),
        Some(&TypedValue::object([("owner", TypedValue::string("ops"))]))
    );
    assert_eq!(config.vars.get("node_count"), Some(&TypedValue::number(4)));

    let cluster = config.module("cluster").unwrap();
    assert_eq!(
        cluster.settings.get("subnetwork"),
        Some(&TypedValue::Reference(Reference::module_output(
            "network",
            "subnetwork_self_link"
        )))
    );
    assert_eq!(cluster.settings.get("startup"), Some(&TypedValue::string("echo ${HOSTNAME}")));
    assert_eq!(cluster.settings.get("machine"), Some(&TypedValue::Unknown));
    assert_eq!(cluster.wrap_settings_with.get("disks").map(Vec::len), Some(2));
    assert!(cluster.outputs[0].sensitive);

    let conn = &config.module_connections("cluster")[0];
    assert_eq!(conn.kind, ConnectionKind::Use);
    assert!(!conn.is_deployment_kind());
}

/// Malformed YAML is reported against the file it came from.
#[test]
fn test_invalid_yaml_names_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("broken.yaml");
    fs::write(&path, "deployment_groups: [ {name: }").unwrap();

    let err = DeploymentConfig::from_file(&path).unwrap_err();
    match err {
        ModelError::InvalidFormat { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

/// The sample config passes validation.
#[test]
fn test_sample_config_is_valid() {
    let report = ConfigValidator::validate(&sample_config());
    assert!(report.is_valid(), "Validation failed: {:?}", report.errors);
}
