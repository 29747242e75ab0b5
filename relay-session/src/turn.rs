//! Draining one `TurnEngine::run` stream into history-ready data (§4.5, §4.9).
//!
//! `TurnEngine` never touches history; `ChatSession` is the layer that
//! decides, after a stream closes, what to fold back into the log and what
//! the caller needs to act on (tool-call requests).

use futures::StreamExt;
use relay_proto::FinishReason;
use relay_turn::TurnEvent;
use relay_types::{GeneratorError, Part};

/// One tool call the model requested during a turn, surfaced to the
/// caller (the outer agent driver hands these to its scheduler).
#[derive(Debug, Clone, PartialEq)]
pub struct PendingToolCall {
    /// Call id, model-provided or backfilled.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Call arguments.
    pub args: serde_json::Value,
}

/// Everything a completed (or aborted) turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Every event the engine emitted, in order — kept for callers that
    /// want to replay or display the turn verbatim.
    pub events: Vec<TurnEvent>,
    /// Assistant-authored parts to append as one `model` history entry.
    /// Empty when the turn produced nothing worth recording (e.g. it
    /// errored before any content arrived).
    pub assistant_parts: Vec<Part>,
    /// Tool calls the model requested this turn.
    pub tool_calls: Vec<PendingToolCall>,
    /// The model's own finish reason, if the stream ended normally.
    pub finish_reason: Option<FinishReason>,
}

impl TurnOutcome {
    fn empty() -> Self {
        Self {
            events: Vec::new(),
            assistant_parts: Vec::new(),
            tool_calls: Vec::new(),
            finish_reason: None,
        }
    }
}

/// Result of draining one turn: either it completed (possibly with zero
/// content, e.g. cancellation) or it hit a generator error the caller's
/// retry policy needs to see.
pub enum DrainedTurn {
    /// The stream ended without a backend error (finished or cancelled).
    Done(TurnOutcome),
    /// The stream ended with a backend error; `outcome` holds whatever was
    /// collected before it, for diagnostics.
    Failed {
        /// The error that ended the stream.
        error: GeneratorError,
        /// Events collected before the failure.
        outcome: TurnOutcome,
    },
}

/// Drain a `TurnEngine::run` stream to completion, classifying each event
/// into the pieces `ChatSession` needs.
pub async fn drain(mut stream: futures::stream::BoxStream<'static, TurnEvent>) -> DrainedTurn {
    let mut outcome = TurnOutcome::empty();

    while let Some(event) = stream.next().await {
        outcome.events.push(event.clone());
        match event {
            TurnEvent::Content(content) => outcome.assistant_parts.extend(content.parts),
            TurnEvent::Thought(thought) => {
                let raw = match &thought.subject {
                    Some(subject) => format!("**{subject}**\n{}", thought.description),
                    None => thought.description.clone(),
                };
                outcome.assistant_parts.push(Part::Thought { text: raw });
            }
            TurnEvent::ToolCallRequest { call_id, name, args } => {
                outcome.assistant_parts.push(Part::FunctionCall {
                    id: call_id.clone(),
                    name: name.clone(),
                    args: args.clone(),
                });
                outcome.tool_calls.push(PendingToolCall { call_id, name, args });
            }
            TurnEvent::Finished(reason) => {
                outcome.finish_reason = Some(reason);
                return DrainedTurn::Done(outcome);
            }
            TurnEvent::UserCancelled => return DrainedTurn::Done(outcome),
            TurnEvent::Error(error) => return DrainedTurn::Failed { error, outcome },
        }
    }

    DrainedTurn::Done(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_types::{Content, Role};

    fn boxed(events: Vec<TurnEvent>) -> futures::stream::BoxStream<'static, TurnEvent> {
        Box::pin(futures::stream::iter(events))
    }

    #[tokio::test]
    async fn collects_text_and_finishes() {
        let events = vec![
            TurnEvent::Content(Content {
                role: Role::Model,
                parts: vec![Part::text("hi")],
            }),
            TurnEvent::Finished(FinishReason::Stop),
        ];
        match drain(boxed(events)).await {
            DrainedTurn::Done(outcome) => {
                assert_eq!(outcome.assistant_parts, vec![Part::text("hi")]);
                assert_eq!(outcome.finish_reason, Some(FinishReason::Stop));
                assert!(outcome.tool_calls.is_empty());
            }
            DrainedTurn::Failed { .. } => panic!("expected Done"),
        }
    }

    #[tokio::test]
    async fn tool_call_becomes_pending_and_function_call_part() {
        let events = vec![
            TurnEvent::ToolCallRequest {
                call_id: "c1".to_string(),
                name: "read_file".to_string(),
                args: serde_json::json!({"path": "a.txt"}),
            },
            TurnEvent::Finished(FinishReason::ToolUse),
        ];
        match drain(boxed(events)).await {
            DrainedTurn::Done(outcome) => {
                assert_eq!(outcome.tool_calls.len(), 1);
                assert_eq!(outcome.tool_calls[0].name, "read_file");
                assert!(matches!(outcome.assistant_parts[0], Part::FunctionCall { .. }));
            }
            DrainedTurn::Failed { .. } => panic!("expected Done"),
        }
    }

    #[tokio::test]
    async fn error_stops_draining_and_reports_partial_outcome() {
        let events = vec![
            TurnEvent::Content(Content {
                role: Role::Model,
                parts: vec![Part::text("partial")],
            }),
            TurnEvent::Error(GeneratorError::QuotaExhausted),
        ];
        match drain(boxed(events)).await {
            DrainedTurn::Failed { error, outcome } => {
                assert!(matches!(error, GeneratorError::QuotaExhausted));
                assert_eq!(outcome.assistant_parts, vec![Part::text("partial")]);
            }
            DrainedTurn::Done(_) => panic!("expected Failed"),
        }
    }

    #[tokio::test]
    async fn cancellation_ends_cleanly_with_no_content() {
        let events = vec![TurnEvent::UserCancelled];
        match drain(boxed(events)).await {
            DrainedTurn::Done(outcome) => assert!(outcome.assistant_parts.is_empty()),
            DrainedTurn::Failed { .. } => panic!("expected Done"),
        }
    }
}
