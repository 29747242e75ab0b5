//! Tool-name and JSON-schema sanitization for model-facing declarations (§4.6).

use serde_json::Value;

const MAX_NAME_LEN: usize = 63;
const TRUNCATED_PREFIX_LEN: usize = 28;
const TRUNCATED_SUFFIX_LEN: usize = 32;
const TRUNCATED_MARKER: &str = "___";

/// Whether `name` already satisfies `[A-Za-z0-9_.-]{1,63}`.
pub fn is_valid_tool_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Sanitize an externally provided tool name: invalid characters become
/// `_`, and names longer than 63 chars are middle-truncated to
/// `28 + "___" + 32` characters.
pub fn sanitize_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if replaced.len() <= MAX_NAME_LEN {
        return replaced;
    }

    let chars: Vec<char> = replaced.chars().collect();
    let prefix: String = chars[..TRUNCATED_PREFIX_LEN].iter().collect();
    let suffix: String = chars[chars.len() - TRUNCATED_SUFFIX_LEN..].iter().collect();
    format!("{prefix}{TRUNCATED_MARKER}{suffix}")
}

/// Build the fully-qualified name used when a dynamically discovered tool
/// collides with an existing registration (§4.6).
pub fn qualify_name(source: &str, original_name: &str) -> String {
    sanitize_name(&format!("{source}__{original_name}"))
}

/// Walk a JSON Schema and strip combinations the model rejects:
/// - `default` alongside `anyOf` (the pair is dropped together to avoid
///   a dangling, now-unconstrained default)
/// - non-string `enum` arrays (coerced to string enums)
pub fn sanitize_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            let has_any_of = map.contains_key("anyOf");
            for (key, value) in map {
                if key == "default" && has_any_of {
                    continue;
                }
                if key == "enum" {
                    out.insert(key.clone(), coerce_enum_to_strings(value));
                    continue;
                }
                out.insert(key.clone(), sanitize_schema(value));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize_schema).collect()),
        other => other.clone(),
    }
}

fn coerce_enum_to_strings(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| match item {
                    Value::String(_) => item.clone(),
                    Value::Null => Value::String("null".to_string()),
                    other => Value::String(other.to_string()),
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_names_pass_through() {
        assert!(is_valid_tool_name("read_file"));
        assert!(is_valid_tool_name("read-file.v2"));
        assert!(!is_valid_tool_name(""));
        assert!(!is_valid_tool_name("read file"));
    }

    #[test]
    fn sanitize_replaces_invalid_chars() {
        assert_eq!(sanitize_name("my tool@v1"), "my_tool_v1");
    }

    #[test]
    fn sanitize_truncates_long_names() {
        let long_name = "a".repeat(100);
        let sanitized = sanitize_name(&long_name);
        assert_eq!(sanitized.len(), 28 + 3 + 32);
        assert!(sanitized.contains("___"));
    }

    #[test]
    fn sanitize_is_idempotent() {
        let cases = ["simple", "has spaces", &"x".repeat(200), "weird@#$%name"];
        for case in cases {
            let once = sanitize_name(case);
            let twice = sanitize_name(&once);
            assert_eq!(once, twice, "not idempotent for {case}");
        }
    }

    #[test]
    fn qualify_name_joins_source_and_name() {
        let qualified = qualify_name("github-mcp", "search_issues");
        assert_eq!(qualified, "github-mcp__search_issues");
    }

    #[test]
    fn schema_strips_default_alongside_any_of() {
        let schema = json!({
            "anyOf": [{"type": "string"}, {"type": "null"}],
            "default": "x",
        });
        let sanitized = sanitize_schema(&schema);
        assert!(sanitized.get("default").is_none());
        assert!(sanitized.get("anyOf").is_some());
    }

    #[test]
    fn schema_keeps_default_without_any_of() {
        let schema = json!({"type": "string", "default": "x"});
        let sanitized = sanitize_schema(&schema);
        assert_eq!(sanitized.get("default"), Some(&json!("x")));
    }

    #[test]
    fn schema_coerces_non_string_enums() {
        let schema = json!({"enum": [1, 2, 3]});
        let sanitized = sanitize_schema(&schema);
        assert_eq!(sanitized["enum"], json!(["1", "2", "3"]));
    }

    #[test]
    fn schema_sanitization_is_idempotent() {
        let schema = json!({
            "anyOf": [{"enum": [1, 2]}, {"type": "null"}],
            "default": 1,
            "nested": {"enum": ["a", "b"]},
        });
        let once = sanitize_schema(&schema);
        let twice = sanitize_schema(&once);
        assert_eq!(once, twice);
    }
}
