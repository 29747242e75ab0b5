//! The pluggable bridge a caller provides to resolve tool calls awaiting
//! confirmation in [`crate::config::ApprovalMode::Interactive`] (§4.7, §4.8).
//!
//! `Scheduler` has no opinion on *how* a confirmation gets resolved — it
//! only exposes `handle_confirmation`. This trait is where that decision
//! actually lives when the loop isn't running in `Yolo` mode: a CLI can
//! implement it as a terminal prompt, a test can implement it as a
//! canned answer.

use async_trait::async_trait;
use relay_tool::{ConfirmationDetails, ConfirmationOutcome, ConfirmationPayload};

/// Decides the outcome of one `AwaitingApproval` tool call.
#[async_trait]
pub trait ApprovalResolver: Send + Sync {
    /// Resolve one confirmation. Called once per `AwaitingApproval` call in
    /// a batch (and again if `ModifyWithEditor` leaves the call awaiting
    /// approval a second time).
    async fn resolve(&self, details: &ConfirmationDetails) -> (ConfirmationOutcome, ConfirmationPayload);
}
