//! Typed configuration values.
//!
//! Values reach the writer already resolved. Anything that must end up as a
//! Terraform reference instead of a literal is carried by [`Reference`], so no
//! rewriting of generated text is needed afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Matches a whole string of the form `((var.name))`.
static VAR_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\(var\.([A-Za-z_][A-Za-z0-9_-]*)\)\)$").unwrap());

/// Matches a whole string of the form `((module.id.output))`.
static MODULE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(\(module\.([A-Za-z_][A-Za-z0-9_-]*)\.([A-Za-z_][A-Za-z0-9_-]*)\)\)$").unwrap()
});

/// Marker used upstream for a `${` that must reach Terraform unevaluated.
const LITERAL_BRACE_MARKER: &str = "\\${";

/// A scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    String(String),
    Bool(bool),
    Number(Number),
}

/// A symbolic reference rendered as an unquoted traversal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Reference {
    /// `var.<name>`: a variable of the deployment group.
    Variable(String),
    /// `module.<id>.<output>`: an output of a module in the same group.
    ModuleOutput { module: String, output: String },
}

impl Reference {
    pub fn variable(name: impl Into<String>) -> Self {
        Reference::Variable(name.into())
    }

    pub fn module_output(module: impl Into<String>, output: impl Into<String>) -> Self {
        Reference::ModuleOutput {
            module: module.into(),
            output: output.into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Variable(name) => write!(f, "var.{}", name),
            Reference::ModuleOutput { module, output } => write!(f, "module.{}.{}", module, output),
        }
    }
}

/// A configuration value with enough shape to render both a literal and a
/// declared type keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value", into = "serde_json::Value")]
pub enum TypedValue {
    Primitive(Primitive),
    Sequence(Vec<TypedValue>),
    Object(BTreeMap<String, TypedValue>),
    Reference(Reference),
    Unknown,
}

impl TypedValue {
    pub fn string(s: impl Into<String>) -> Self {
        TypedValue::Primitive(Primitive::String(s.into()))
    }

    pub fn bool(b: bool) -> Self {
        TypedValue::Primitive(Primitive::Bool(b))
    }

    pub fn number(n: impl Into<Number>) -> Self {
        TypedValue::Primitive(Primitive::Number(n.into()))
    }

    pub fn var(name: impl Into<String>) -> Self {
        TypedValue::Reference(Reference::variable(name))
    }

    pub fn sequence(items: impl IntoIterator<Item = TypedValue>) -> Self {
        TypedValue::Sequence(items.into_iter().collect())
    }

    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, TypedValue)>) -> Self {
        TypedValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Convert an upstream string, recognizing the reference and literal-brace
    /// markers.
    pub fn from_marked_str(s: &str) -> Self {
        if let Some(caps) = VAR_MARKER.captures(s) {
            return TypedValue::Reference(Reference::Variable(caps[1].to_string()));
        }
        if let Some(caps) = MODULE_MARKER.captures(s) {
            return TypedValue::Reference(Reference::ModuleOutput {
                module: caps[1].to_string(),
                output: caps[2].to_string(),
            });
        }
        TypedValue::string(s.replace(LITERAL_BRACE_MARKER, "${"))
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            TypedValue::Primitive(Primitive::String(_)) => "string",
            TypedValue::Primitive(Primitive::Bool(_)) => "bool",
            TypedValue::Primitive(Primitive::Number(_)) => "number",
            TypedValue::Sequence(_) => "sequence",
            TypedValue::Object(_) => "object",
            TypedValue::Reference(_) => "reference",
            TypedValue::Unknown => "unknown",
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, TypedValue::Sequence(_))
    }
}

impl Default for TypedValue {
    fn default() -> Self {
        TypedValue::Unknown
    }
}

impl From<Value> for TypedValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TypedValue::Unknown,
            Value::Bool(b) => TypedValue::bool(b),
            Value::Number(n) => TypedValue::Primitive(Primitive::Number(n)),
            Value::String(s) => TypedValue::from_marked_str(&s),
            Value::Array(items) => TypedValue::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                TypedValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<TypedValue> for Value {
    fn from(value: TypedValue) -> Self {
        match value {
            TypedValue::Unknown => Value::Null,
            TypedValue::Primitive(Primitive::Bool(b)) => Value::Bool(b),
            TypedValue::Primitive(Primitive::Number(n)) => Value::Number(n),
            TypedValue::Primitive(Primitive::String(s)) => {
                Value::String(s.replace("${", LITERAL_BRACE_MARKER))
            }
            TypedValue::Reference(r) => Value::String(format!("(({}))", r)),
            TypedValue::Sequence(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            TypedValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_marker_becomes_reference() {
        assert_eq!(
            TypedValue::from_marked_str("((var.project_id))"),
            TypedValue::var("project_id")
        );
    }

    #[test]
    fn test_module_marker_becomes_reference() {
        assert_eq!(
            TypedValue::from_marked_str("((module.network.network_id))"),
            TypedValue::Reference(Reference::module_output("network", "network_id"))
        );
    }

    #[test]
    fn test_embedded_marker_stays_a_string() {
        assert_eq!(
            TypedValue::from_marked_str("prefix-((var.zone))"),
            TypedValue::string("prefix-((var.zone))")
        );
    }

    #[test]
    fn test_literal_brace_marker() {
        assert_eq!(
            TypedValue::from_marked_str(r"echo \${HOME}"),
            TypedValue::string("echo ${HOME}")
        );
    }

    #[test]
    fn test_from_json_value() {
        let value: TypedValue = serde_json::json!({
            "b": [1, true, null],
            "a": "x",
        })
        .into();

        let expected = TypedValue::object([
            ("a", TypedValue::string("x")),
            (
                "b",
                TypedValue::sequence([TypedValue::number(1), TypedValue::bool(true), TypedValue::Unknown]),
            ),
        ]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_markers_survive_serialization() {
        let original = TypedValue::sequence([
            TypedValue::var("region"),
            TypedValue::string("${literal}"),
        ]);
        let yaml = serde_yaml::to_string(&original).unwrap();
        let parsed: TypedValue = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_reference_display() {
        assert_eq!(Reference::variable("zone").to_string(), "var.zone");
        assert_eq!(Reference::module_output("a", "b").to_string(), "module.a.b");
    }
}
