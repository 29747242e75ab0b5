//! Confirmation vocabulary exchanged between the scheduler and the UI (§6).

use serde_json::Value;

/// Details surfaced to the UI when a tool call requires confirmation.
///
/// `on_confirm` is invoked by the UI with the user's decision; the
/// scheduler wraps it so it learns the outcome (§4.7 step 4).
#[non_exhaustive]
#[derive(Clone)]
pub enum ConfirmationDetails {
    /// Confirming an edit to a file.
    Edit {
        /// Dialog title.
        title: String,
        /// File being edited.
        file_name: String,
        /// Unified diff of the proposed change.
        diff: String,
        /// Content before the edit.
        original_content: String,
        /// Content after the edit.
        new_content: String,
        /// Whether an editor-bridge round trip is currently in flight.
        is_modifying: bool,
    },
    /// Confirming a shell command.
    Exec {
        /// Dialog title.
        title: String,
        /// Full command line.
        command: String,
        /// The command's root executable, for allowlist purposes.
        root_command: String,
    },
    /// Confirming a call to an MCP-provided tool.
    Mcp {
        /// Dialog title.
        title: String,
        /// MCP server name.
        server_name: String,
        /// Tool name as registered.
        tool_name: String,
        /// Tool name as displayed to the user.
        tool_display_name: String,
    },
    /// A generic informational confirmation (e.g. "fetch this URL?").
    Info {
        /// Dialog title.
        title: String,
        /// Prompt text.
        prompt: String,
        /// Any URLs relevant to the confirmation.
        urls: Vec<String>,
    },
}

impl ConfirmationDetails {
    /// The tool/source identity this confirmation can be remembered against
    /// for `ProceedAlwaysTool` / `ProceedAlwaysServer` (§4.7).
    pub fn allowlist_key(&self, tool_name: &str) -> String {
        match self {
            ConfirmationDetails::Mcp { server_name, .. } => server_name.clone(),
            _ => tool_name.to_string(),
        }
    }
}

/// The user's decision on an `AwaitingApproval` call (§4.7).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Reject the call.
    Cancel,
    /// Approve once.
    ProceedOnce,
    /// Approve and remember for this tool for the rest of the session.
    ProceedAlwaysTool,
    /// Approve and remember for this tool's source (e.g. MCP server) for
    /// the rest of the session.
    ProceedAlwaysServer,
    /// Open the editor bridge before deciding.
    ModifyWithEditor,
}

/// Optional payload accompanying a confirmation outcome.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationPayload {
    /// Inline-edited content, when the user edited the diff directly
    /// (as opposed to going through the editor bridge).
    pub new_content: Option<String>,
}

impl ConfirmationPayload {
    /// No payload.
    pub fn none() -> Self {
        Self::default()
    }

    /// A payload carrying inline-edited content.
    pub fn with_new_content(content: impl Into<String>) -> Self {
        Self {
            new_content: Some(content.into()),
        }
    }
}

/// Re-exported for callers building `Info` confirmations against arbitrary
/// JSON payloads (e.g. tool-specific context).
pub type ConfirmationContext = Value;
