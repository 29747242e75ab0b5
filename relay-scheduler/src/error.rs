//! Scheduler-level errors (§7).

/// Errors the scheduler itself raises, distinct from per-call [`relay_types::ToolError`].
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// A new batch was scheduled while a previous batch was still in
    /// flight (§4.7 single-batch invariant).
    #[error("a tool-call batch is already running")]
    AlreadyRunning,
    /// `handle_confirmation` or `attempt_execution` referenced a call id
    /// the scheduler has no record of.
    #[error("unknown call id: {0}")]
    UnknownCall(String),
    /// A confirmation outcome was supplied for a call not currently
    /// `AwaitingApproval`.
    #[error("call {0} is not awaiting approval")]
    NotAwaitingApproval(String),
    /// No tool is registered under the requested name.
    #[error("no tool registered: {0}")]
    UnknownTool(String),
    /// `ModifyWithEditor` was chosen for a tool with no `ModifyContext`.
    #[error("tool {0} does not support edit confirmations")]
    ModifyContextUnavailable(String),
    /// A per-call validation or execution failure.
    #[error(transparent)]
    Tool(#[from] relay_types::ToolError),
}
