//! Canonicalizing a tool's raw `execute` result into `FunctionResponse`
//! part(s) suitable for the history (§4.7).
//!
//! A tool may hand back a plain string, a list of parts, or a single part
//! that's already a `FunctionResponse`. The rules below always produce a
//! `Vec<Part>` that starts with exactly one `FunctionResponse` part, so
//! the scheduler can uniformly fold it into a `user` history entry
//! regardless of what the tool actually returned.

use relay_tool::LlmContent;
use relay_types::Part;

/// Canonicalize one call's result into the part(s) appended to the
/// function-response history entry.
pub fn canonicalize(call_id: &str, name: &str, content: &LlmContent) -> Vec<Part> {
    match content {
        LlmContent::Text(text) => vec![function_response(call_id, name, text_payload(text))],
        LlmContent::Single(part) => canonicalize_single(call_id, name, part),
        LlmContent::Parts(parts) => canonicalize_parts(call_id, name, parts),
    }
}

fn canonicalize_single(call_id: &str, name: &str, part: &Part) -> Vec<Part> {
    match part {
        Part::FunctionResponse { id, name, payload } => {
            vec![Part::FunctionResponse {
                id: id.clone(),
                name: name.clone(),
                payload: payload.clone(),
            }]
        }
        Part::InlineBlob { mime, .. } | Part::FileRef { mime, .. } => {
            vec![function_response(call_id, name, binary_payload(mime))]
        }
        Part::Text { text } => vec![function_response(call_id, name, text_payload(text))],
        other => vec![function_response(call_id, name, text_payload(&format!("{other:?}")))],
    }
}

fn canonicalize_parts(call_id: &str, name: &str, parts: &[Part]) -> Vec<Part> {
    if let [Part::FunctionResponse { id, name, payload }] = parts {
        return vec![Part::FunctionResponse {
            id: id.clone(),
            name: name.clone(),
            payload: payload.clone(),
        }];
    }

    let mut out = vec![function_response(
        call_id,
        name,
        serde_json::json!({ "output": "Tool execution succeeded." }),
    )];
    out.extend(parts.iter().cloned());
    out
}

fn function_response(call_id: &str, name: &str, payload: serde_json::Value) -> Part {
    Part::FunctionResponse {
        id: call_id.to_string(),
        name: name.to_string(),
        payload,
    }
}

fn text_payload(text: &str) -> serde_json::Value {
    serde_json::json!({ "output": text })
}

fn binary_payload(mime: &str) -> serde_json::Value {
    serde_json::json!({ "output": format!("Binary content of type {mime} was processed.") })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_content_wraps_as_output() {
        let result = canonicalize("call-1", "read_file", &LlmContent::Text("hello".to_string()));
        assert_eq!(result.len(), 1);
        assert!(matches!(&result[0], Part::FunctionResponse { payload, .. } if payload["output"] == "hello"));
    }

    #[test]
    fn single_function_response_passes_through() {
        let original = Part::FunctionResponse {
            id: "call-1".to_string(),
            name: "read_file".to_string(),
            payload: serde_json::json!({"output": "direct"}),
        };
        let result = canonicalize("call-1", "read_file", &LlmContent::Single(original.clone()));
        assert_eq!(result, vec![original]);
    }

    #[test]
    fn binary_single_part_gets_placeholder_text() {
        let part = Part::InlineBlob {
            mime: "image/png".to_string(),
            bytes: "base64data".to_string(),
        };
        let result = canonicalize("call-1", "screenshot", &LlmContent::Single(part));
        assert!(matches!(
            &result[0],
            Part::FunctionResponse { payload, .. }
                if payload["output"] == "Binary content of type image/png was processed."
        ));
    }

    #[test]
    fn parts_with_single_function_response_flattens() {
        let fr = Part::FunctionResponse {
            id: "call-1".to_string(),
            name: "read_file".to_string(),
            payload: serde_json::json!({"output": "flattened"}),
        };
        let result = canonicalize("call-1", "read_file", &LlmContent::Parts(vec![fr.clone()]));
        assert_eq!(result, vec![fr]);
    }

    #[test]
    fn multi_part_content_keeps_header_plus_originals() {
        let parts = vec![
            Part::text("summary"),
            Part::InlineBlob {
                mime: "image/png".to_string(),
                bytes: "data".to_string(),
            },
        ];
        let result = canonicalize("call-1", "render", &LlmContent::Parts(parts.clone()));
        assert_eq!(result.len(), 3);
        assert!(matches!(result[0], Part::FunctionResponse { .. }));
        assert_eq!(&result[1..], &parts[..]);
    }
}
