//! `AgentLoop`: the outer driver for one top-level prompt (§4.9).
//!
//! Ties together `ChatSession` (retry/fallback/history), `Scheduler`
//! (tool-call lifecycle), and `LoopDetector` (runaway-output guard) into
//! the single operation a caller actually wants: "run this prompt to
//! completion, handling tool calls and model continuation along the way".

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use std::sync::Arc;

use relay_proto::CancellationToken;
use relay_scheduler::{canonicalize, Scheduler, ToolCallRequest, ToolCallState, ToolCallStatus};
use relay_session::{ChatSession, PendingToolCall, TurnOutcome};
use relay_tool::{ConfirmationOutcome, ConfirmationPayload, LlmContent, ToolRegistry};
use relay_loopguard::{LoopDetector, Signal};
use relay_turn::TurnEvent;
use relay_types::{LoopError, Part};

use crate::config::{ApprovalMode, AgentLoopConfig};
use crate::next_speaker::{self, NextSpeaker};

/// Bound on repeated confirmation rounds for a single batch (a call can
/// re-enter `AwaitingApproval` after `ModifyWithEditor`); guards against a
/// misbehaving resolver looping forever.
const MAX_CONFIRMATION_ROUNDS: usize = 8;

/// What to send on the next turn of a prompt's continuation chain.
enum PendingSend {
    /// The original user submission — clears `quota_sticky` on the session.
    TopLevel(Vec<Part>),
    /// Tool-call results, or a synthetic "please continue" nudge.
    Continuation(Vec<Part>),
}

/// Everything one `run_prompt` call produced.
pub struct AgentOutcome {
    /// Every Turn run while driving this prompt, in order.
    pub turns: Vec<TurnOutcome>,
    /// The compression record, if history was compacted before any Turn
    /// in this prompt ran.
    pub compression: Option<relay_history::CompressionRecord>,
}

/// Drives one prompt (and any model-initiated continuations) to
/// completion against a single [`ChatSession`].
pub struct AgentLoop {
    session: ChatSession,
    scheduler: Scheduler,
    loop_detector: StdMutex<LoopDetector>,
    last_prompt_id: StdMutex<Option<String>>,
    turns_used: AtomicUsize,
    config: AgentLoopConfig,
}

impl AgentLoop {
    /// Build a driver around `session`, scheduling tool calls against
    /// `registry`.
    pub fn new(session: ChatSession, registry: Arc<ToolRegistry>, config: AgentLoopConfig) -> Self {
        Self {
            session,
            scheduler: Scheduler::new(registry),
            loop_detector: StdMutex::new(LoopDetector::new()),
            last_prompt_id: StdMutex::new(None),
            turns_used: AtomicUsize::new(0),
            config,
        }
    }

    /// The session this loop drives, for callers that need direct access
    /// (e.g. to read raw history after the prompt completes).
    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Run `parts` as a new top-level prompt to completion (§4.9).
    ///
    /// `prompt_id` identifies this prompt for loop-detector reset
    /// purposes (§4.4): a new id resets the detector, a repeated id (a
    /// model-initiated continuation of the same prompt) does not.
    pub async fn run_prompt(
        &self,
        prompt_id: &str,
        cwd: &Path,
        parts: Vec<Part>,
        cancel: CancellationToken,
    ) -> Result<AgentOutcome, LoopError> {
        self.reset_detector_if_new_prompt(prompt_id);

        let mut turns = Vec::new();
        let mut compression = None;
        let mut pending_send = PendingSend::TopLevel(parts);

        loop {
            if cancel.is_cancelled() {
                return Err(LoopError::Cancelled);
            }
            self.bump_turn_counter()?;

            if let Some(record) = self.session.try_compress(false).await? {
                compression = Some(record);
            }

            let send_result = match pending_send {
                PendingSend::TopLevel(mut user_parts) => {
                    if let Some(ide_text) = self.config.ide_context.as_ref().and_then(|ctx| ctx.render()) {
                        user_parts.insert(0, Part::text(ide_text));
                    }
                    self.session.send_message(cwd, user_parts, cancel.clone()).await?
                }
                PendingSend::Continuation(response_parts) => {
                    self.session
                        .continue_with_tool_results(cwd, response_parts, cancel.clone())
                        .await?
                }
            };

            self.observe_loop_guard(&send_result.outcome)?;

            let tool_calls = send_result.outcome.tool_calls.clone();
            let model_switched_this_turn = send_result.model_switched_this_turn;
            turns.push(send_result.outcome);

            if tool_calls.is_empty() {
                if cancel.is_cancelled() {
                    return Err(LoopError::Cancelled);
                }
                // A fallback switch mid-Turn means the backend is degraded;
                // don't chase a next-speaker continuation on top of that.
                if model_switched_this_turn {
                    break;
                }
                let model = self.session.current_model();
                let history = self.session.curated_history().await;
                match next_speaker::ask(self.session.generator(), &model, history).await {
                    NextSpeaker::Model => {
                        pending_send = PendingSend::Continuation(vec![Part::text("Please continue.")]);
                        continue;
                    }
                    NextSpeaker::User => break,
                }
            }

            let response_parts = self.run_tool_batch(tool_calls, &cancel).await?;
            pending_send = PendingSend::Continuation(response_parts);
        }

        Ok(AgentOutcome { turns, compression })
    }

    async fn run_tool_batch(
        &self,
        tool_calls: Vec<PendingToolCall>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Part>, LoopError> {
        let requests = tool_calls
            .into_iter()
            .map(|call| ToolCallRequest {
                call_id: call.call_id,
                name: call.name,
                args: call.args,
            })
            .collect();

        self.scheduler.schedule(requests, cancel).await.map_err(scheduler_error)?;
        self.resolve_confirmations(cancel).await?;
        self.scheduler.attempt_execution(cancel).await.map_err(scheduler_error)?;

        let states = self.scheduler.maybe_complete().await.unwrap_or_default();
        let mut parts = Vec::new();
        for state in &states {
            let content = llm_content_for(state);
            parts.extend(canonicalize(&state.request.call_id, &state.request.name, &content));
        }
        Ok(parts)
    }

    /// Resolve every `AwaitingApproval` call in the current batch.
    ///
    /// Loops because `ModifyWithEditor` can leave a call back in
    /// `AwaitingApproval` for a second round; bounded so a resolver bug
    /// can't spin forever.
    async fn resolve_confirmations(&self, cancel: &CancellationToken) -> Result<(), LoopError> {
        for _ in 0..MAX_CONFIRMATION_ROUNDS {
            let awaiting: Vec<ToolCallState> = self
                .scheduler
                .states()
                .await
                .into_iter()
                .filter(|state| matches!(state.status, ToolCallStatus::AwaitingApproval { .. }))
                .collect();
            if awaiting.is_empty() {
                return Ok(());
            }

            for state in awaiting {
                let ToolCallStatus::AwaitingApproval { details, .. } = &state.status else {
                    continue;
                };
                let (outcome, payload) = match &self.config.approval_mode {
                    ApprovalMode::Yolo => (ConfirmationOutcome::ProceedOnce, ConfirmationPayload::none()),
                    ApprovalMode::Interactive(resolver) => resolver.resolve(details).await,
                };
                self.scheduler
                    .handle_confirmation(&state.request.call_id, outcome, payload, cancel)
                    .await
                    .map_err(scheduler_error)?;
            }
        }
        Ok(())
    }

    fn bump_turn_counter(&self) -> Result<(), LoopError> {
        let used = self.turns_used.fetch_add(1, Ordering::AcqRel) + 1;
        if used > self.config.max_session_turns {
            return Err(LoopError::MaxSessionTurns(self.config.max_session_turns));
        }
        Ok(())
    }

    fn reset_detector_if_new_prompt(&self, prompt_id: &str) {
        let mut last = self.last_prompt_id.lock().expect("poisoned");
        if last.as_deref() != Some(prompt_id) {
            self.loop_detector.lock().expect("poisoned").reset();
            *last = Some(prompt_id.to_string());
        }
    }

    fn observe_loop_guard(&self, outcome: &TurnOutcome) -> Result<(), LoopError> {
        let mut detector = self.loop_detector.lock().expect("poisoned");
        for event in &outcome.events {
            let tripped = match event {
                TurnEvent::Content(content) => content.parts.iter().any(|part| match part {
                    Part::Text { text } => detector.observe(Signal::Text(text)),
                    _ => false,
                }),
                TurnEvent::ToolCallRequest { name, args, .. } => {
                    detector.observe(Signal::ToolCall { name, args })
                }
                _ => false,
            };
            if tripped {
                return Err(LoopError::LoopDetected);
            }
        }
        Ok(())
    }
}

fn llm_content_for(state: &ToolCallState) -> LlmContent {
    match &state.status {
        ToolCallStatus::Success { result } => result.llm_content.clone(),
        ToolCallStatus::Error { error } => LlmContent::Text(error.to_string()),
        ToolCallStatus::Cancelled => LlmContent::Text("Tool call cancelled by user.".to_string()),
        // Validating/Scheduled/Executing/AwaitingApproval never reach here:
        // `maybe_complete` only hands back batches where every call is terminal.
        _ => LlmContent::Text(String::new()),
    }
}

fn scheduler_error(error: relay_scheduler::SchedulerError) -> LoopError {
    LoopError::Scheduler(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream};
    use relay_proto::{AuthKind, ContentGenerator, FinishReason, GenerateRequest, GenerateResponse, TokenUsage};
    use relay_session::{ChatSession, ChatSessionConfig};
    use relay_tool::{ConfirmationDetails, ProgressSink, ToolDescriptor, ToolExecutionResult};
    use relay_types::{Content, GeneratorError, ToolError, ToolKind, ToolMeta};
    use serde_json::json;
    use std::sync::Mutex as StdMutex;

    /// A generator whose `generate_stream` replies are scripted per call
    /// and whose one-shot `generate` (the next-speaker probe) always says
    /// to stop, so tests don't have to script an unbounded continuation
    /// chain.
    struct ScriptedGenerator {
        replies: StdMutex<Vec<Vec<Result<GenerateResponse, GeneratorError>>>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Vec<Result<GenerateResponse, GeneratorError>>>) -> Self {
            Self {
                replies: StdMutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for ScriptedGenerator {
        fn auth_kind(&self) -> AuthKind {
            AuthKind::ApiKey
        }

        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, GeneratorError> {
            Ok(GenerateResponse {
                parts: vec![Part::text(r#"{"next_speaker": "user", "reasoning": "done"}"#)],
                finish_reason: Some(FinishReason::Stop),
                usage: TokenUsage::default(),
            })
        }

        fn generate_stream(
            &self,
            _request: GenerateRequest,
        ) -> BoxStream<'static, Result<GenerateResponse, GeneratorError>> {
            let mut replies = self.replies.lock().expect("poisoned");
            let next = if replies.is_empty() { Vec::new() } else { replies.remove(0) };
            Box::pin(stream::iter(next))
        }

        async fn count_tokens(&self, _model: &str, _contents: &[Content]) -> Result<usize, GeneratorError> {
            Ok(0)
        }

        async fn embed(&self, _model: &str, _texts: Vec<String>) -> Result<Vec<Vec<f32>>, GeneratorError> {
            Ok(vec![])
        }
    }

    fn ok_chunk(text: &str, finish: FinishReason) -> Result<GenerateResponse, GeneratorError> {
        Ok(GenerateResponse {
            parts: vec![Part::text(text)],
            finish_reason: Some(finish),
            usage: TokenUsage::default(),
        })
    }

    fn tool_call_chunk(call_id: &str, name: &str, args: serde_json::Value) -> Result<GenerateResponse, GeneratorError> {
        Ok(GenerateResponse {
            parts: vec![Part::FunctionCall {
                id: call_id.to_string(),
                name: name.to_string(),
                args,
            }],
            finish_reason: Some(FinishReason::ToolUse),
            usage: TokenUsage::default(),
        })
    }

    fn assembler() -> relay_prompt::PromptAssembler {
        relay_prompt::PromptAssembler::new(relay_prompt::PromptAssemblerConfig {
            config_dir: std::env::temp_dir().join("relay-agent-test-config"),
            ..Default::default()
        })
    }

    struct EchoTool {
        meta: ToolMeta,
    }

    impl EchoTool {
        fn new() -> Self {
            Self {
                meta: ToolMeta {
                    name: "read_file".to_string(),
                    display_name: "read_file".to_string(),
                    description: "reads a file".to_string(),
                    params_schema: json!({"type": "object"}),
                    kind: ToolKind::Pure,
                },
            }
        }
    }

    #[async_trait]
    impl ToolDescriptor for EchoTool {
        fn meta(&self) -> &ToolMeta {
            &self.meta
        }

        fn validate_params(&self, _args: &serde_json::Value) -> Result<(), ToolError> {
            Ok(())
        }

        fn describe_action(&self, _args: &serde_json::Value) -> String {
            "read a file".to_string()
        }

        async fn should_confirm(
            &self,
            _args: &serde_json::Value,
            _cancel: &CancellationToken,
        ) -> Option<ConfirmationDetails> {
            None
        }

        async fn execute(
            &self,
            _args: serde_json::Value,
            _cancel: CancellationToken,
            _on_progress: Option<ProgressSink>,
        ) -> Result<ToolExecutionResult, ToolError> {
            Ok(ToolExecutionResult::text("The file contains: hello world"))
        }
    }

    fn loop_with(generator: ScriptedGenerator, registry: Arc<ToolRegistry>, config: AgentLoopConfig) -> AgentLoop {
        let session = ChatSession::new(
            Arc::new(generator),
            assembler(),
            registry.clone(),
            ChatSessionConfig {
                primary_model: "primary".to_string(),
                ..Default::default()
            },
        );
        AgentLoop::new(session, registry, config)
    }

    #[tokio::test]
    async fn single_text_turn_stops_after_probe_says_user() {
        let generator = ScriptedGenerator::new(vec![vec![ok_chunk("Hi!", FinishReason::Stop)]]);
        let driver = loop_with(generator, Arc::new(ToolRegistry::new()), AgentLoopConfig::default());

        let outcome = driver
            .run_prompt("prompt-1", Path::new("/tmp"), vec![Part::text("hello")], CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.turns.len(), 1);
        assert_eq!(outcome.turns[0].assistant_parts, vec![Part::text("Hi!")]);
    }

    #[tokio::test]
    async fn tool_call_round_trip_in_yolo_mode() {
        let generator = ScriptedGenerator::new(vec![
            vec![tool_call_chunk("c1", "read_file", json!({"path": "/w/a.txt"}))],
            vec![ok_chunk("The file contains: hello world", FinishReason::Stop)],
        ]);
        let mut registry = ToolRegistry::new();
        registry.register_static(Arc::new(EchoTool::new()));
        let driver = loop_with(generator, Arc::new(registry), AgentLoopConfig::default());

        let outcome = driver
            .run_prompt(
                "prompt-1",
                Path::new("/tmp"),
                vec![Part::text("read a.txt")],
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(outcome.turns.len(), 2);
        assert_eq!(outcome.turns[0].tool_calls.len(), 1);
        assert!(outcome.turns[1].tool_calls.is_empty());

        let raw = driver.session().raw_history().await;
        // user, model(call), user(function response), model(final text)
        assert_eq!(raw.len(), 4);
        assert!(raw[2].parts.iter().any(Part::is_function_response));
    }

    #[tokio::test]
    async fn max_session_turns_is_enforced() {
        let generator = ScriptedGenerator::new(vec![vec![ok_chunk("Hi!", FinishReason::Stop)]]);
        let driver = loop_with(
            generator,
            Arc::new(ToolRegistry::new()),
            AgentLoopConfig {
                max_session_turns: 0,
                ..Default::default()
            },
        );

        let err = driver
            .run_prompt("prompt-1", Path::new("/tmp"), vec![Part::text("hello")], CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LoopError::MaxSessionTurns(0)));
    }

    #[tokio::test]
    async fn repeated_text_trips_loop_detector() {
        let generator = ScriptedGenerator::new(vec![vec![ok_chunk("stuck", FinishReason::ToolUse)]]);
        let driver = loop_with(generator, Arc::new(ToolRegistry::new()), AgentLoopConfig::default());

        // Seed the detector directly to just below threshold, then let one
        // more observed chunk trip it — avoids scripting a long reply chain.
        // Pin `last_prompt_id` first so `run_prompt` doesn't reset the seed
        // away as "a new prompt".
        *driver.last_prompt_id.lock().unwrap() = Some("prompt-1".to_string());
        {
            let mut detector = driver.loop_detector.lock().unwrap();
            for _ in 0..relay_loopguard::TEXT_THRESHOLD - 1 {
                detector.observe(Signal::Text("stuck"));
            }
        }

        let err = driver
            .run_prompt("prompt-1", Path::new("/tmp"), vec![Part::text("hello")], CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LoopError::LoopDetected));
    }

    #[tokio::test]
    async fn new_prompt_id_resets_detector() {
        let generator = ScriptedGenerator::new(vec![
            vec![ok_chunk("stuck", FinishReason::Stop)],
            vec![ok_chunk("stuck", FinishReason::Stop)],
        ]);
        let driver = loop_with(generator, Arc::new(ToolRegistry::new()), AgentLoopConfig::default());

        {
            let mut detector = driver.loop_detector.lock().unwrap();
            for _ in 0..relay_loopguard::TEXT_THRESHOLD - 1 {
                detector.observe(Signal::Text("stuck"));
            }
        }

        // A fresh prompt id resets the detector, so the same text chunk
        // does not immediately trip it again.
        let outcome = driver
            .run_prompt("prompt-2", Path::new("/tmp"), vec![Part::text("hello")], CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(outcome.turns.len(), 1);
    }
}
