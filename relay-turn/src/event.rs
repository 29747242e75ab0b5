//! Typed events the turn engine emits (§4.2).

use crate::thought::Thought;
use relay_proto::FinishReason;
use relay_types::{Content, GeneratorError};

/// A single demuxed unit of model output.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// User- or model-visible content (text, inline media, function calls
    /// folded back into a `Content` for history purposes).
    Content(Content),
    /// A reasoning fragment, split into subject/description.
    Thought(Thought),
    /// The model requested a tool call.
    ToolCallRequest {
        /// Call id, as provided by the model or generated (§4.5).
        call_id: String,
        /// Tool name.
        name: String,
        /// Call arguments.
        args: serde_json::Value,
    },
    /// The stream ended normally.
    Finished(FinishReason),
    /// The stream ended with a backend error.
    Error(GeneratorError),
    /// The caller cancelled the turn before it finished.
    UserCancelled,
}
