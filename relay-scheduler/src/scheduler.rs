//! The tool-call scheduler (§4.7): validate → confirm → execute → complete.

use crate::error::SchedulerError;
use crate::state::{ToolCallRequest, ToolCallState, ToolCallStatus};
use relay_proto::CancellationToken;
use relay_tool::{
    ConfirmationOutcome, ConfirmationPayload, ProgressReporter, ProgressSink, ToolRegistry,
};
use relay_types::ToolError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

struct Inner {
    calls: Vec<ToolCallState>,
    /// Tool/server identities the user chose to always approve for the
    /// rest of the session (§4.7 `ProceedAlwaysTool` / `ProceedAlwaysServer`).
    allowlist: HashSet<String>,
}

/// Owns the lifecycle of one batch of tool calls.
///
/// Only one batch may be in flight at a time (§4.7 single-batch
/// invariant) — `schedule` rejects a new batch while the previous one
/// has calls that haven't reached a terminal status. All mutation of
/// call state goes through the single `Mutex<Inner>`, so concurrent
/// execution of multiple calls never races on scheduler bookkeeping even
/// though the calls themselves run concurrently.
pub struct Scheduler {
    registry: Arc<ToolRegistry>,
    inner: Arc<Mutex<Inner>>,
}

/// Writes streamed tool output back into the owning call's `Executing`
/// state. Uses `try_lock` rather than `lock().await` since `report` is a
/// synchronous callback — a contended lock just drops that chunk's update
/// rather than blocking the tool's execution.
struct ProgressWriter {
    inner: Arc<Mutex<Inner>>,
    call_id: String,
}

impl ProgressReporter for ProgressWriter {
    fn report(&self, chunk: &str) {
        let Ok(mut inner) = self.inner.try_lock() else {
            return;
        };
        if let Some(state) = inner.calls.iter_mut().find(|c| c.request.call_id == self.call_id) {
            if let ToolCallStatus::Executing { live_output } = &mut state.status {
                live_output.push_str(chunk);
            }
        }
    }
}

impl Scheduler {
    /// Build a scheduler backed by `registry`.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            inner: Arc::new(Mutex::new(Inner {
                calls: Vec::new(),
                allowlist: HashSet::new(),
            })),
        }
    }

    /// Whether a batch is currently in flight.
    pub async fn is_running(&self) -> bool {
        let inner = self.inner.lock().await;
        inner.calls.iter().any(|c| !c.status.is_terminal())
    }

    /// Current snapshot of every call in the batch.
    pub async fn states(&self) -> Vec<ToolCallState> {
        self.inner.lock().await.calls.clone()
    }

    /// Begin a new batch: validate each request and, for those that
    /// require it, move to `AwaitingApproval`; everything else goes
    /// straight to `Scheduled`.
    ///
    /// Validation and confirmation checks run concurrently across the
    /// batch — they only read the registry and an allowlist snapshot, so
    /// there's nothing to serialize until results are written back.
    pub async fn schedule(
        &self,
        requests: Vec<ToolCallRequest>,
        cancel: &CancellationToken,
    ) -> Result<(), SchedulerError> {
        if self.is_running().await {
            return Err(SchedulerError::AlreadyRunning);
        }

        let allowlist = self.inner.lock().await.allowlist.clone();
        let validations = requests
            .into_iter()
            .map(|request| self.validate_one(request, cancel, &allowlist));
        let states = futures::future::join_all(validations).await;

        let mut inner = self.inner.lock().await;
        inner.calls = states;
        Ok(())
    }

    async fn validate_one(
        &self,
        request: ToolCallRequest,
        cancel: &CancellationToken,
        allowlist: &HashSet<String>,
    ) -> ToolCallState {
        let Some(tool) = self.registry.get(&request.name) else {
            return ToolCallState {
                status: ToolCallStatus::Error {
                    error: ToolError::NotFound(request.name.clone()),
                },
                request,
            };
        };

        if let Err(error) = tool.validate_params(&request.args) {
            return ToolCallState {
                status: ToolCallStatus::Error { error },
                request,
            };
        }

        match tool.should_confirm(&request.args, cancel).await {
            None => ToolCallState {
                status: ToolCallStatus::Scheduled,
                request,
            },
            Some(details) => {
                let key = details.allowlist_key(&request.name);
                if allowlist.contains(&key) {
                    ToolCallState {
                        status: ToolCallStatus::Scheduled,
                        request,
                    }
                } else {
                    ToolCallState {
                        status: ToolCallStatus::AwaitingApproval {
                            details,
                            is_modifying: false,
                        },
                        request,
                    }
                }
            }
        }
    }

    /// Run every `Scheduled` call to completion.
    ///
    /// Calls execute concurrently; the scheduler mutates state once before
    /// dispatch (Scheduled → Executing) and once after (Executing →
    /// Success/Error), holding the lock only for those two bookkeeping
    /// steps, not for the execution itself.
    pub async fn attempt_execution(&self, cancel: &CancellationToken) -> Result<(), SchedulerError> {
        let to_run = {
            let mut inner = self.inner.lock().await;
            let mut list = Vec::new();
            for state in inner.calls.iter_mut() {
                if matches!(state.status, ToolCallStatus::Scheduled) {
                    state.status = ToolCallStatus::Executing {
                        live_output: String::new(),
                    };
                    list.push(state.request.clone());
                }
            }
            list
        };

        if to_run.is_empty() {
            return Ok(());
        }

        let results = futures::future::join_all(
            to_run.iter().map(|request| self.execute_one(request, cancel)),
        )
        .await;

        let mut inner = self.inner.lock().await;
        for (request, status) in to_run.iter().zip(results) {
            if let Some(state) = inner
                .calls
                .iter_mut()
                .find(|c| c.request.call_id == request.call_id)
            {
                state.status = status;
            }
        }
        Ok(())
    }

    async fn execute_one(&self, request: &ToolCallRequest, cancel: &CancellationToken) -> ToolCallStatus {
        let Some(tool) = self.registry.get(&request.name) else {
            return ToolCallStatus::Error {
                error: ToolError::NotFound(request.name.clone()),
            };
        };

        let on_progress: Option<ProgressSink> = tool.supports_streaming_output().then(|| {
            Arc::new(ProgressWriter {
                inner: Arc::clone(&self.inner),
                call_id: request.call_id.clone(),
            }) as ProgressSink
        });

        let result = tool.execute(request.args.clone(), cancel.clone(), on_progress).await;

        if cancel.is_cancelled() {
            return ToolCallStatus::Cancelled;
        }

        match result {
            Ok(result) => ToolCallStatus::Success { result },
            Err(error) => ToolCallStatus::Error { error },
        }
    }

    /// Apply the user's decision on an `AwaitingApproval` call (§4.7).
    pub async fn handle_confirmation(
        &self,
        call_id: &str,
        outcome: ConfirmationOutcome,
        payload: ConfirmationPayload,
        cancel: &CancellationToken,
    ) -> Result<(), SchedulerError> {
        let (name, args, details) = {
            let inner = self.inner.lock().await;
            let state = inner
                .calls
                .iter()
                .find(|c| c.request.call_id == call_id)
                .ok_or_else(|| SchedulerError::UnknownCall(call_id.to_string()))?;
            match &state.status {
                ToolCallStatus::AwaitingApproval { details, .. } => (
                    state.request.name.clone(),
                    state.request.args.clone(),
                    details.clone(),
                ),
                _ => return Err(SchedulerError::NotAwaitingApproval(call_id.to_string())),
            }
        };

        let new_status = match outcome {
            ConfirmationOutcome::Cancel => ToolCallStatus::Cancelled,
            ConfirmationOutcome::ProceedOnce => ToolCallStatus::Scheduled,
            ConfirmationOutcome::ProceedAlwaysTool | ConfirmationOutcome::ProceedAlwaysServer => {
                let key = details.allowlist_key(&name);
                self.inner.lock().await.allowlist.insert(key);
                ToolCallStatus::Scheduled
            }
            ConfirmationOutcome::ModifyWithEditor => {
                self.apply_editor_modification(call_id, &name, &args, payload, cancel)
                    .await?
            }
        };

        let mut inner = self.inner.lock().await;
        if let Some(state) = inner.calls.iter_mut().find(|c| c.request.call_id == call_id) {
            state.status = new_status;
        }
        Ok(())
    }

    async fn apply_editor_modification(
        &self,
        call_id: &str,
        name: &str,
        args: &serde_json::Value,
        payload: ConfirmationPayload,
        cancel: &CancellationToken,
    ) -> Result<ToolCallStatus, SchedulerError> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| SchedulerError::UnknownTool(name.to_string()))?;
        let modify_ctx = tool
            .modify_context()
            .ok_or_else(|| SchedulerError::ModifyContextUnavailable(name.to_string()))?;

        let old_content = modify_ctx.current_content(args).await?;
        let edited_content = payload.new_content.unwrap_or_else(|| old_content.clone());
        let new_args = modify_ctx.updated_params(&old_content, &edited_content, args)?;

        {
            let mut inner = self.inner.lock().await;
            if let Some(state) = inner.calls.iter_mut().find(|c| c.request.call_id == call_id) {
                state.request.args = new_args.clone();
            }
        }

        Ok(match tool.should_confirm(&new_args, cancel).await {
            Some(details) => ToolCallStatus::AwaitingApproval {
                details,
                is_modifying: false,
            },
            None => ToolCallStatus::Scheduled,
        })
    }

    /// If every call in the batch has reached a terminal status, return
    /// the final snapshot; otherwise `None`. The caller uses this to
    /// decide when to canonicalize results back into history.
    pub async fn maybe_complete(&self) -> Option<Vec<ToolCallState>> {
        let inner = self.inner.lock().await;
        if !inner.calls.is_empty() && inner.calls.iter().all(|c| c.status.is_terminal()) {
            Some(inner.calls.clone())
        } else {
            None
        }
    }
}
