//! The per-call state machine (§4.7).

use relay_tool::{ConfirmationDetails, ToolExecutionResult};
use relay_types::ToolError;

/// A tool call as requested by the model, before any scheduling decisions.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    /// Unique id for this call (model-provided or backfilled, §4.5).
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Call arguments.
    pub args: serde_json::Value,
}

/// Where a scheduled call currently sits in its lifecycle.
///
/// Transitions (§4.7):
/// `Validating` → `Scheduled` | `AwaitingApproval` | `Error`
/// `AwaitingApproval` → `Scheduled` | `Cancelled` | `AwaitingApproval` (self-loop on `ModifyWithEditor`)
/// `Scheduled` → `Executing`
/// `Executing` → `Success` | `Error` | `Cancelled`
#[derive(Debug, Clone)]
pub enum ToolCallStatus {
    /// Parameters are being validated against the tool's schema.
    Validating,
    /// Waiting on a user decision before execution.
    AwaitingApproval {
        /// What to show the user.
        details: ConfirmationDetails,
        /// Whether an editor-bridge round trip is in flight for this call.
        is_modifying: bool,
    },
    /// Approved (or never required approval) and ready to run.
    Scheduled,
    /// Currently running.
    Executing {
        /// Incremental output streamed so far via `onProgress`, if the tool
        /// advertises streaming support. Empty otherwise.
        live_output: String,
    },
    /// Completed successfully.
    Success {
        /// The tool's raw result, before canonicalization into history.
        result: ToolExecutionResult,
    },
    /// Failed validation or execution.
    Error {
        /// The failure.
        error: ToolError,
    },
    /// Rejected by the user, or cancelled before completion.
    Cancelled,
}

impl ToolCallStatus {
    /// Whether this status is terminal (no further transitions occur).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ToolCallStatus::Success { .. } | ToolCallStatus::Error { .. } | ToolCallStatus::Cancelled
        )
    }
}

/// One call tracked by the scheduler across its full lifecycle.
#[derive(Debug, Clone)]
pub struct ToolCallState {
    /// The originating request.
    pub request: ToolCallRequest,
    /// Current lifecycle status.
    pub status: ToolCallStatus,
}

impl ToolCallState {
    /// A freshly scheduled call, starting in `Validating`.
    pub fn new(request: ToolCallRequest) -> Self {
        Self {
            request,
            status: ToolCallStatus::Validating,
        }
    }
}
