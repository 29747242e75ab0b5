//! The `ToolDescriptor` contract (§3, §4.6, §6).

use crate::confirm::ConfirmationDetails;
use async_trait::async_trait;
use relay_proto::CancellationToken;
use relay_types::{Part, ToolError, ToolMeta};
use std::sync::Arc;

/// Reports incremental tool output while a call is executing (§4.7
/// `attemptExecution`'s `onProgress`). Only wired when
/// [`ToolDescriptor::supports_streaming_output`] is `true`.
pub trait ProgressReporter: Send + Sync {
    /// Report one chunk of incremental output.
    fn report(&self, chunk: &str);
}

/// Type-erased progress sink handed to `execute`.
pub type ProgressSink = Arc<dyn ProgressReporter>;

/// The raw, polymorphic result shape a tool's `execute` returns, before
/// scheduler canonicalization into a `FunctionResponse` (§4.7).
#[derive(Debug, Clone)]
pub enum LlmContent {
    /// A plain string result.
    Text(String),
    /// A list of parts (e.g. text plus an inline image).
    Parts(Vec<Part>),
    /// A single part, possibly already a `FunctionResponse`.
    Single(Part),
}

/// What the UI should render for this call, independent of what goes back
/// to the model.
#[derive(Debug, Clone)]
pub enum ReturnDisplay {
    /// Plain text for the UI.
    Text(String),
    /// A file diff for the UI's diff viewer.
    FileDiff {
        /// Path of the affected file.
        file_path: String,
        /// Unified diff text.
        diff: String,
    },
}

/// The result of a successful `execute` call.
#[derive(Debug, Clone)]
pub struct ToolExecutionResult {
    /// Content destined for the model, after canonicalization.
    pub llm_content: LlmContent,
    /// Content destined for the UI.
    pub return_display: ReturnDisplay,
    /// Optional one-line summary (e.g. for compact history views).
    pub summary: Option<String>,
}

impl ToolExecutionResult {
    /// Build a plain-text result with matching UI and model content.
    pub fn text(output: impl Into<String>) -> Self {
        let output = output.into();
        Self {
            llm_content: LlmContent::Text(output.clone()),
            return_display: ReturnDisplay::Text(output),
            summary: None,
        }
    }
}

/// The adapter a tool provides so a confirmation-time inline edit can be
/// back-translated into updated tool arguments (§4.8).
#[async_trait]
pub trait ModifyContext: Send + Sync {
    /// Path of the file being edited, given the current args.
    fn file_path(&self, args: &serde_json::Value) -> String;

    /// Content of the file before the proposed edit.
    async fn current_content(&self, args: &serde_json::Value) -> Result<String, ToolError>;

    /// Content of the file after the proposed edit.
    async fn proposed_content(&self, args: &serde_json::Value) -> Result<String, ToolError>;

    /// Rebuild the tool's arguments from post-edit buffers.
    fn updated_params(
        &self,
        old_content: &str,
        edited_content: &str,
        args: &serde_json::Value,
    ) -> Result<serde_json::Value, ToolError>;
}

/// A registered, invocable tool.
///
/// Object-safe by construction: every method takes `&self` and returns a
/// boxed future via `async_trait`, so `Arc<dyn ToolDescriptor>` is usable
/// directly in the registry and scheduler.
#[async_trait]
pub trait ToolDescriptor: Send + Sync {
    /// Static metadata (name, description, schema, kind).
    fn meta(&self) -> &ToolMeta;

    /// Validate `args` against the tool's schema and any tool-specific
    /// invariants. Called once per call before scheduling.
    fn validate_params(&self, args: &serde_json::Value) -> Result<(), ToolError>;

    /// A human-readable one-line description of what this call will do,
    /// used in confirmation dialogs and logs.
    fn describe_action(&self, args: &serde_json::Value) -> String;

    /// Decide whether this call needs user confirmation.
    ///
    /// Returns `None` to proceed straight to `Scheduled`. Returns
    /// `Some(details)` to move the call to `AwaitingApproval`.
    async fn should_confirm(
        &self,
        args: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Option<ConfirmationDetails>;

    /// Execute the call.
    ///
    /// `on_progress` is `Some` only when [`Self::supports_streaming_output`]
    /// is `true`.
    async fn execute(
        &self,
        args: serde_json::Value,
        cancel: CancellationToken,
        on_progress: Option<ProgressSink>,
    ) -> Result<ToolExecutionResult, ToolError>;

    /// Whether `execute` will call `on_progress` with incremental chunks.
    fn supports_streaming_output(&self) -> bool {
        false
    }

    /// The modify-context adapter, if this tool supports inline-edit
    /// confirmations (§4.8). `None` by default.
    fn modify_context(&self) -> Option<Arc<dyn ModifyContext>> {
        None
    }
}
