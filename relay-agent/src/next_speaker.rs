//! The next-speaker probe (§4.9 step 6, §9 open questions).
//!
//! After a Turn finishes with no pending tool calls, the loop asks a
//! one-shot auxiliary model call whether the model itself should keep
//! going. The probe's prompt fixes the expected JSON shape; if the call
//! fails for any reason, that counts as "stop" and the loop never
//! continues on a hunch.

use relay_proto::{ContentGenerator, GenerateRequest};
use relay_types::Content;

const PROBE_INSTRUCTION: &str = r#"Based solely on the conversation so far, decide whether you (the model) still owe the user further action before the user speaks again, or whether the turn is complete and it is the user's turn to speak.

Respond with nothing but a single JSON object of the exact shape:
{"next_speaker": "user" | "model", "reasoning": "<one short sentence>"}
"#;

/// The probe's parsed verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextSpeaker {
    /// The user should speak next; the loop stops.
    User,
    /// The model still owes more output; the loop continues with a
    /// synthetic "Please continue." message.
    Model,
}

/// Ask the probe who should speak next, given the curated history so far.
///
/// Any failure (generator error, missing/invalid JSON) resolves to
/// `NextSpeaker::User` — a failed probe means stop (§9).
pub async fn ask(generator: &dyn ContentGenerator, model: &str, curated_history: Vec<Content>) -> NextSpeaker {
    let mut request = GenerateRequest::new(model, curated_history);
    request.system_instruction = Some(PROBE_INSTRUCTION.to_string());

    let response = match generator.generate(request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::debug!(%error, "next-speaker probe call failed; stopping");
            return NextSpeaker::User;
        }
    };

    let text: String = response
        .parts
        .iter()
        .filter_map(|part| match part {
            relay_types::Part::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect();

    match parse_verdict(&text) {
        Some(NextSpeaker::Model) => NextSpeaker::Model,
        _ => NextSpeaker::User,
    }
}

fn parse_verdict(text: &str) -> Option<NextSpeaker> {
    let value: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
    match value.get("next_speaker")?.as_str()? {
        "model" => Some(NextSpeaker::Model),
        "user" => Some(NextSpeaker::User),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_model_verdict() {
        let text = r#"{"next_speaker": "model", "reasoning": "still has a pending step"}"#;
        assert_eq!(parse_verdict(text), Some(NextSpeaker::Model));
    }

    #[test]
    fn parses_user_verdict() {
        let text = r#"{"next_speaker": "user", "reasoning": "done"}"#;
        assert_eq!(parse_verdict(text), Some(NextSpeaker::User));
    }

    #[test]
    fn malformed_json_has_no_verdict() {
        assert_eq!(parse_verdict("not json"), None);
    }

    #[test]
    fn unknown_value_has_no_verdict() {
        let text = r#"{"next_speaker": "maybe"}"#;
        assert_eq!(parse_verdict(text), None);
    }
}
