//! Rendering typed values as HCL token text.

use forge_model::{Primitive, TypedValue};

use crate::error::RenderError;

/// Type keyword for a declared variable.
///
/// Sequences always map to `list` whatever their elements are, and anything
/// without a primitive type maps to `any`.
pub fn hcl_type(value: &TypedValue) -> &'static str {
    match value {
        TypedValue::Primitive(Primitive::String(_)) => "string",
        TypedValue::Primitive(Primitive::Bool(_)) => "bool",
        TypedValue::Primitive(Primitive::Number(_)) => "number",
        TypedValue::Sequence(_) => "list",
        TypedValue::Object(_) | TypedValue::Reference(_) | TypedValue::Unknown => "any",
    }
}

/// Render a value as an HCL expression.
pub fn tokens_for_value(value: &TypedValue) -> String {
    match value {
        TypedValue::Primitive(Primitive::String(s)) => quote_string(s),
        TypedValue::Primitive(Primitive::Bool(b)) => b.to_string(),
        TypedValue::Primitive(Primitive::Number(n)) => n.to_string(),
        TypedValue::Sequence(items) => format!("[{}]", join_elements(items)),
        TypedValue::Object(map) if map.is_empty() => "{}".to_string(),
        TypedValue::Object(map) => {
            let entries = map
                .iter()
                .map(|(k, v)| format!("{} = {}", object_key(k), tokens_for_value(v)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {} }}", entries)
        }
        TypedValue::Reference(r) => r.to_string(),
        TypedValue::Unknown => "null".to_string(),
    }
}

/// Render a sequence between a raw prefix and suffix, e.g. inside a function
/// call: `flatten([` + `["a"], ["b"]` + `])`.
pub fn tokens_for_wrapped(prefix: &str, value: &TypedValue, suffix: &str) -> Result<String, RenderError> {
    match value {
        TypedValue::Sequence(items) => Ok(format!("{}{}{}", prefix, join_elements(items), suffix)),
        other => Err(RenderError::NotASequence(other.kind())),
    }
}

/// Render a value, honoring an optional wrap directive.
pub fn render(value: &TypedValue, wrap: Option<&[String]>) -> Result<String, RenderError> {
    match wrap {
        None => Ok(tokens_for_value(value)),
        Some([prefix, suffix]) => tokens_for_wrapped(prefix, value, suffix),
        Some(other) => Err(RenderError::InvalidWrapLength(other.len())),
    }
}

/// Quote a string literal. Template introducers are doubled so Terraform
/// keeps them as literal text.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out.replace("${", "$${").replace("%{", "%%{")
}

/// Whether `s` can be written as a bare HCL identifier.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Words that start an expression in an object key position.
const KEYWORDS: [&str; 6] = ["for", "if", "in", "null", "true", "false"];

fn object_key(key: &str) -> String {
    if is_identifier(key) && !KEYWORDS.contains(&key) {
        key.to_string()
    } else {
        quote_string(key)
    }
}

fn join_elements(items: &[TypedValue]) -> String {
    items.iter().map(tokens_for_value).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_model::Reference;

    fn strings(items: &[&str]) -> TypedValue {
        TypedValue::sequence(items.iter().map(|s| TypedValue::string(*s)))
    }

    #[test]
    fn test_primitives() {
        assert_eq!(tokens_for_value(&TypedValue::string("abc")), "\"abc\"");
        assert_eq!(tokens_for_value(&TypedValue::bool(false)), "false");
        assert_eq!(tokens_for_value(&TypedValue::number(42)), "42");
        assert_eq!(tokens_for_value(&TypedValue::Unknown), "null");
    }

    #[test]
    fn test_float_literal() {
        let value: TypedValue = serde_json::json!(0.25).into();
        assert_eq!(tokens_for_value(&value), "0.25");
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(quote_string(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(quote_string(r"C:\tmp"), r#""C:\\tmp""#);
        assert_eq!(quote_string("a\nb"), r#""a\nb""#);
    }

    #[test]
    fn test_template_introducers_doubled() {
        assert_eq!(quote_string("echo ${HOME}"), r#""echo $${HOME}""#);
        assert_eq!(quote_string("%{ if x }"), r#""%%{ if x }""#);
    }

    #[test]
    fn test_sequence_and_object() {
        assert_eq!(tokens_for_value(&strings(&["a", "b"])), r#"["a", "b"]"#);
        assert_eq!(tokens_for_value(&TypedValue::sequence([])), "[]");

        let obj = TypedValue::object([
            ("zeta", TypedValue::number(1)),
            ("alpha", TypedValue::string("x")),
            ("my key", TypedValue::bool(true)),
        ]);
        assert_eq!(
            tokens_for_value(&obj),
            r#"{ alpha = "x", "my key" = true, zeta = 1 }"#
        );
        assert_eq!(tokens_for_value(&TypedValue::object(Vec::<(String, TypedValue)>::new())), "{}");
    }

    #[test]
    fn test_keyword_keys_quoted() {
        let obj = TypedValue::object([
            ("for", TypedValue::number(1)),
            ("if", TypedValue::number(2)),
            ("in", TypedValue::number(3)),
            ("null", TypedValue::number(4)),
            ("true", TypedValue::number(5)),
            ("false", TypedValue::number(6)),
            ("format", TypedValue::number(7)),
        ]);
        let tokens = tokens_for_value(&obj);
        assert_eq!(
            tokens,
            r#"{ "false" = 6, "for" = 1, format = 7, "if" = 2, "in" = 3, "null" = 4, "true" = 5 }"#
        );

        let body = ::hcl::parse(&format!("x = {}\n", tokens)).unwrap();
        assert_eq!(body.attributes().count(), 1);
    }

    #[test]
    fn test_references_unquoted() {
        assert_eq!(tokens_for_value(&TypedValue::var("zone")), "var.zone");
        assert_eq!(
            tokens_for_value(&TypedValue::Reference(Reference::module_output("net", "id"))),
            "module.net.id"
        );
        assert_eq!(
            tokens_for_value(&TypedValue::sequence([TypedValue::var("a"), TypedValue::string("b")])),
            r#"[var.a, "b"]"#
        );
    }

    #[test]
    fn test_wrapped_sequence() {
        let value = TypedValue::sequence([strings(&["a"]), strings(&["b", "c"])]);
        let wrap = vec!["flatten([".to_string(), "])".to_string()];
        assert_eq!(
            render(&value, Some(&wrap)).unwrap(),
            r#"flatten([["a"], ["b", "c"]])"#
        );
    }

    #[test]
    fn test_wrap_requires_sequence() {
        let wrap = vec!["f(".to_string(), ")".to_string()];
        assert_eq!(
            render(&TypedValue::string("x"), Some(&wrap)),
            Err(RenderError::NotASequence("string"))
        );
    }

    #[test]
    fn test_wrap_requires_pair() {
        let wrap = vec!["f(".to_string()];
        assert_eq!(
            render(&strings(&["a"]), Some(&wrap)),
            Err(RenderError::InvalidWrapLength(1))
        );
        let wrap = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(
            render(&strings(&["a"]), Some(&wrap)),
            Err(RenderError::InvalidWrapLength(3))
        );
    }

    #[test]
    fn test_type_keywords() {
        assert_eq!(hcl_type(&TypedValue::string("x")), "string");
        assert_eq!(hcl_type(&TypedValue::bool(true)), "bool");
        assert_eq!(hcl_type(&TypedValue::number(1)), "number");
        assert_eq!(hcl_type(&strings(&["a"])), "list");
        assert_eq!(
            hcl_type(&TypedValue::sequence([TypedValue::object([("a", TypedValue::number(1))])])),
            "list"
        );
        assert_eq!(hcl_type(&TypedValue::object([("a", TypedValue::number(1))])), "any");
        assert_eq!(hcl_type(&TypedValue::var("x")), "any");
        assert_eq!(hcl_type(&TypedValue::Unknown), "any");
    }

    #[test]
    fn test_identifiers() {
        assert!(is_identifier("network_id"));
        assert!(is_identifier("google-beta"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier(""));
    }
}
