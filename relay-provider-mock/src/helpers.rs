//! Small constructors for the [`GenerateResponse`] shapes tests script most
//! often, so callers don't hand-build `TokenUsage::default()` boilerplate
//! at every call site.

use relay_proto::{FinishReason, GenerateResponse, TokenUsage};
use relay_types::Part;

/// A non-terminal streamed chunk carrying one text part.
pub fn ok_chunk(text: &str) -> Result<GenerateResponse, relay_types::GeneratorError> {
    Ok(GenerateResponse {
        parts: vec![Part::text(text)],
        finish_reason: None,
        usage: TokenUsage::default(),
    })
}

/// The terminal chunk of a streamed response.
pub fn final_chunk(text: &str, finish_reason: FinishReason) -> Result<GenerateResponse, relay_types::GeneratorError> {
    Ok(GenerateResponse {
        parts: vec![Part::text(text)],
        finish_reason: Some(finish_reason),
        usage: TokenUsage::default(),
    })
}

/// A one-shot `generate` reply carrying a single text part, finished.
pub fn text_response(text: &str) -> GenerateResponse {
    GenerateResponse {
        parts: vec![Part::text(text)],
        finish_reason: Some(FinishReason::Stop),
        usage: TokenUsage::default(),
    }
}

/// A streamed chunk requesting a tool call; `ToolUse` finish reason since a
/// `FunctionCall` part always ends its turn (§4.1).
pub fn tool_call_chunk(
    call_id: &str,
    name: &str,
    args: serde_json::Value,
) -> Result<GenerateResponse, relay_types::GeneratorError> {
    Ok(GenerateResponse {
        parts: vec![Part::FunctionCall {
            id: call_id.to_string(),
            name: name.to_string(),
            args,
        }],
        finish_reason: Some(FinishReason::ToolUse),
        usage: TokenUsage::default(),
    })
}

/// A one-shot `generate` reply requesting a tool call.
pub fn tool_call_response(call_id: &str, name: &str, args: serde_json::Value) -> GenerateResponse {
    GenerateResponse {
        parts: vec![Part::FunctionCall {
            id: call_id.to_string(),
            name: name.to_string(),
            args,
        }],
        finish_reason: Some(FinishReason::ToolUse),
        usage: TokenUsage::default(),
    }
}
