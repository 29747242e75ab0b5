//! Universal content types that cross every turn boundary.

use serde::{Deserialize, Serialize};

/// Who authored a piece of [`Content`].
///
/// Role alternation is not enforced here — two consecutive `User` entries
/// are legal (see [`Content::is_function_response_only`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A human user, or a tool-result turn fed back as the user.
    User,
    /// The model.
    Model,
}

/// A single tagged part within a [`Content`] entry.
///
/// Intentionally flat — no nested `Content`. Anything that needs its own
/// role lives at the `Content` level, not inside a `Part`.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Part {
    /// Plain assistant- or user-visible text.
    Text {
        /// The text payload.
        text: String,
    },
    /// Small binary payload carried inline (image bytes, audio, etc.).
    InlineBlob {
        /// MIME type of `bytes`.
        mime: String,
        /// Base64-encoded bytes.
        bytes: String,
    },
    /// A reference to a larger binary object stored elsewhere.
    FileRef {
        /// MIME type of the referenced file.
        mime: String,
        /// URI locating the file.
        uri: String,
    },
    /// The model requesting that a tool be invoked.
    FunctionCall {
        /// Model-provided or generated call id, unique within the session.
        id: String,
        /// Name of the tool to invoke.
        name: String,
        /// JSON arguments for the call.
        args: serde_json::Value,
    },
    /// The result of a tool invocation, fed back as a `User` part.
    FunctionResponse {
        /// The `FunctionCall::id` this responds to.
        id: String,
        /// Name of the tool that produced this response.
        name: String,
        /// Arbitrary JSON payload describing the outcome.
        payload: serde_json::Value,
    },
    /// A reasoning/thinking fragment, not meant for the end user verbatim.
    Thought {
        /// The raw thought text (subject/description split happens downstream).
        text: String,
    },
}

impl Part {
    /// Shorthand for a text part.
    pub fn text(s: impl Into<String>) -> Self {
        Part::Text { text: s.into() }
    }

    /// Whether this part is a [`Part::Thought`].
    pub fn is_thought(&self) -> bool {
        matches!(self, Part::Thought { .. })
    }

    /// Whether this part is a [`Part::FunctionResponse`].
    pub fn is_function_response(&self) -> bool {
        matches!(self, Part::FunctionResponse { .. })
    }

    /// Whether this part carries user/assistant-visible non-empty content.
    ///
    /// Used by curation (§4.3): a `model` entry is kept only if it has at
    /// least one part for which this returns `true`.
    pub fn is_meaningful(&self) -> bool {
        match self {
            Part::Text { text } => !text.trim().is_empty(),
            Part::Thought { .. } => false,
            _ => true,
        }
    }
}

/// One turn's worth of content: a role plus an ordered list of parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    /// Author of this entry.
    pub role: Role,
    /// Ordered parts making up this entry.
    pub parts: Vec<Part>,
}

impl Content {
    /// Build a plain-text `user` entry.
    pub fn user_text(text: impl Into<String>) -> Self {
        Content {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    /// Build a plain-text `model` entry.
    pub fn model_text(text: impl Into<String>) -> Self {
        Content {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Build a `user` entry carrying only function responses.
    pub fn function_responses(parts: Vec<Part>) -> Self {
        debug_assert!(parts.iter().all(Part::is_function_response));
        Content {
            role: Role::User,
            parts,
        }
    }

    /// Whether every part of this entry is a [`Part::FunctionResponse`].
    ///
    /// Per §3: two consecutive `user` entries are allowed only when the
    /// second carries only `FunctionResponse` parts.
    pub fn is_function_response_only(&self) -> bool {
        self.role == Role::User
            && !self.parts.is_empty()
            && self.parts.iter().all(Part::is_function_response)
    }

    /// Whether any part would keep this `model` entry in the curated view.
    pub fn has_meaningful_part(&self) -> bool {
        self.parts.iter().any(Part::is_meaningful)
    }

    /// Serialized character weight used as the (deliberately non-token-accurate)
    /// proxy for compression split-point selection — see §4.10 step 3.
    pub fn char_weight(&self) -> usize {
        serde_json::to_string(self).map(|s| s.len()).unwrap_or(0)
    }
}
