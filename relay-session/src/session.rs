//! `ChatSession`: the stateful object a caller sends prompts to (§4.9).
//!
//! Owns the raw history, the system-prompt assembler, the tool registry and
//! a single `ContentGenerator`. `send_message` serializes concurrent callers
//! through a capacity-one gate (mirroring the single in-flight-send
//! discipline design notes describe), retries transient failures, falls
//! back to a secondary model when the backend and auth kind allow it, and
//! folds the resulting turn back into history.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use relay_proto::{CancellationToken, ContentGenerator, GenerateRequest};
use relay_prompt::PromptAssembler;
use relay_tool::ToolRegistry;
use relay_turn::TurnEngine;
use relay_types::{Content, GeneratorError, HistoryError, Role};
use tokio::sync::Mutex;

use crate::config::ChatSessionConfig;
use crate::error::SessionError;
use crate::turn::{drain, DrainedTurn, TurnOutcome};

/// Outcome of one `send_message` call, with bookkeeping the outer agent
/// driver needs beyond the raw turn data.
pub struct SendResult {
    /// Everything the turn produced.
    pub outcome: TurnOutcome,
    /// The model this turn actually ran against (primary or fallback).
    pub model_used: String,
    /// Whether the fallback model was switched to *during this call*
    /// (as opposed to already having been switched by a prior call).
    /// The outer agent driver uses this to skip its next-speaker
    /// continuation probe for this turn (§9 design notes).
    pub model_switched_this_turn: bool,
}

/// A single conversation: history, generator, prompt assembly, and the
/// retry/fallback policy around one model endpoint.
pub struct ChatSession {
    history: Mutex<relay_history::HistoryStore>,
    generator: Arc<dyn ContentGenerator>,
    assembler: PromptAssembler,
    registry: Arc<ToolRegistry>,
    turn_engine: TurnEngine,
    config: ChatSessionConfig,
    send_gate: Mutex<()>,
    quota_sticky: AtomicBool,
    fallback_active: AtomicBool,
}

impl ChatSession {
    /// Build a session around an empty history.
    pub fn new(
        generator: Arc<dyn ContentGenerator>,
        assembler: PromptAssembler,
        registry: Arc<ToolRegistry>,
        config: ChatSessionConfig,
    ) -> Self {
        Self::with_history(generator, assembler, registry, config, relay_history::HistoryStore::new())
    }

    /// Build a session around a history loaded from elsewhere (e.g. a saved
    /// session resumed across processes).
    pub fn with_history(
        generator: Arc<dyn ContentGenerator>,
        assembler: PromptAssembler,
        registry: Arc<ToolRegistry>,
        config: ChatSessionConfig,
        history: relay_history::HistoryStore,
    ) -> Self {
        Self {
            history: Mutex::new(history),
            generator,
            assembler,
            registry,
            turn_engine: TurnEngine::new(),
            config,
            send_gate: Mutex::new(()),
            quota_sticky: AtomicBool::new(false),
            fallback_active: AtomicBool::new(false),
        }
    }

    /// The raw, uncurated history log.
    pub async fn raw_history(&self) -> Vec<Content> {
        self.history.lock().await.raw().to_vec()
    }

    /// Whether the fallback model has been switched to at any point in this
    /// session's lifetime.
    pub fn model_switched_during_session(&self) -> bool {
        self.fallback_active.load(Ordering::Acquire)
    }

    /// The generator backing this session, for callers that need to run an
    /// auxiliary call outside the normal turn flow (e.g. the outer agent
    /// driver's next-speaker probe).
    pub fn generator(&self) -> &dyn ContentGenerator {
        self.generator.as_ref()
    }

    /// The model this session would use if `send_message` were called
    /// right now (primary, or fallback if already switched).
    pub fn current_model(&self) -> String {
        self.current_model_impl()
    }

    /// The curated, model-facing history as it stands right now.
    pub async fn curated_history(&self) -> Vec<Content> {
        self.history.lock().await.curated()
    }

    fn can_fallback(&self) -> bool {
        self.config.fallback_model.is_some() && self.generator.auth_kind().supports_fallback()
    }

    fn current_model_impl(&self) -> String {
        if self.fallback_active.load(Ordering::Acquire) {
            self.config
                .fallback_model
                .clone()
                .unwrap_or_else(|| self.config.primary_model.clone())
        } else {
            self.config.primary_model.clone()
        }
    }

    /// Send a new top-level user turn and run it to completion, retrying
    /// and falling back as the error taxonomy and config allow (§7).
    ///
    /// This is the one operation that clears a prior `QuotaSticky` refusal
    /// — per §7, the sticky flag lives until "a new top-level prompt", and
    /// this is what a new top-level prompt means here. Continuing a turn
    /// with tool results is not a new prompt: use
    /// [`ChatSession::continue_with_tool_results`] for that, which respects
    /// (and never clears) the sticky flag.
    ///
    /// Only one send/continue runs at a time per session; concurrent
    /// callers queue on the send gate rather than being rejected.
    pub async fn send_message(
        &self,
        cwd: &Path,
        user_parts: Vec<relay_types::Part>,
        cancel: CancellationToken,
    ) -> Result<SendResult, SessionError> {
        let _gate = self.send_gate.lock().await;
        self.quota_sticky.store(false, Ordering::Release);
        self.run_turn(cwd, Content { role: Role::User, parts: user_parts }, cancel)
            .await
    }

    /// Continue an in-progress turn with the results of tool calls the
    /// model requested (§4.5, §4.7). Unlike [`ChatSession::send_message`]
    /// this does not clear the quota-sticky flag — a tool-result round
    /// trip is a continuation of the same prompt, not a new one.
    pub async fn continue_with_tool_results(
        &self,
        cwd: &Path,
        tool_response_parts: Vec<relay_types::Part>,
        cancel: CancellationToken,
    ) -> Result<SendResult, SessionError> {
        let _gate = self.send_gate.lock().await;
        if self.quota_sticky.load(Ordering::Acquire) {
            return Err(SessionError::QuotaSticky);
        }
        self.run_turn(
            cwd,
            Content {
                role: Role::User,
                parts: tool_response_parts,
            },
            cancel,
        )
        .await
    }

    async fn run_turn(
        &self,
        cwd: &Path,
        new_entry: Content,
        cancel: CancellationToken,
    ) -> Result<SendResult, SessionError> {
        {
            let mut history = self.history.lock().await;
            history.append(new_entry);
        }

        let switched_before = self.fallback_active.load(Ordering::Acquire);
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(SessionError::Cancelled);
            }
            attempt += 1;

            let model = self.current_model();
            let request = self.build_request(cwd, &model).await?;
            let stream = self.turn_engine.run(self.generator.as_ref(), request, cancel.clone());

            match drain(stream).await {
                DrainedTurn::Done(outcome) => {
                    self.fold(&outcome).await;
                    let switched_this_turn =
                        !switched_before && self.fallback_active.load(Ordering::Acquire);
                    return Ok(SendResult {
                        outcome,
                        model_used: model,
                        model_switched_this_turn: switched_this_turn,
                    });
                }
                DrainedTurn::Failed { error, .. } => {
                    if let Some(outcome) = self.handle_failure(&error, &mut attempt).await? {
                        self.fold(&outcome).await;
                        let switched_this_turn =
                            !switched_before && self.fallback_active.load(Ordering::Acquire);
                        return Ok(SendResult {
                            outcome,
                            model_used: self.current_model(),
                            model_switched_this_turn: switched_this_turn,
                        });
                    }
                    // Otherwise `handle_failure` already decided to retry or
                    // switch models; loop again.
                }
            }
        }
    }

    /// Decide what to do with a failed attempt: retry, switch to the
    /// fallback model, go sticky, or give up. Returns `Ok(None)` when the
    /// caller should loop and try again, `Ok(Some(_))` only as an escape
    /// hatch this design never actually takes (kept for symmetry with
    /// `Err`, which is the real terminal path).
    async fn handle_failure(
        &self,
        error: &GeneratorError,
        attempt: &mut u32,
    ) -> Result<Option<TurnOutcome>, SessionError> {
        if matches!(error, GeneratorError::Auth(_)) {
            return Err(SessionError::Generator(error.clone()));
        }

        if matches!(error, GeneratorError::QuotaExhausted) {
            if self.fallback_active.load(Ordering::Acquire) || !self.can_fallback() {
                self.quota_sticky.store(true, Ordering::Release);
                return Err(SessionError::QuotaSticky);
            }
            self.fallback_active.store(true, Ordering::Release);
            *attempt = 0;
            return Ok(None);
        }

        if error.is_persistent_rate_limit(*attempt, self.config.backoff.max_attempts)
            && self.can_fallback()
            && !self.fallback_active.load(Ordering::Acquire)
        {
            self.fallback_active.store(true, Ordering::Release);
            *attempt = 0;
            return Ok(None);
        }

        if error.is_retryable() && *attempt < self.config.backoff.max_attempts {
            let retry_after = match error {
                GeneratorError::Transient { retry_after, .. } => *retry_after,
                _ => None,
            };
            tokio::time::sleep(self.config.backoff.delay_for(*attempt, retry_after)).await;
            return Ok(None);
        }

        Err(SessionError::Generator(error.clone()))
    }

    async fn fold(&self, outcome: &TurnOutcome) {
        if outcome.assistant_parts.is_empty() {
            return;
        }
        let mut history = self.history.lock().await;
        history.append(Content {
            role: Role::Model,
            parts: outcome.assistant_parts.clone(),
        });
    }

    async fn build_request(&self, cwd: &Path, model: &str) -> Result<GenerateRequest, SessionError> {
        let system_instruction = self.assembler.assemble(cwd).await?;
        let curated = self.history.lock().await.curated();
        let mut request = GenerateRequest::new(model, curated);
        request.system_instruction = Some(system_instruction);
        request.tools = self.registry.tool_metas();
        Ok(request)
    }

    /// Compress history if it exceeds `context_token_limit * compression_threshold`
    /// tokens (strictly; sitting exactly at the threshold does not trigger
    /// compression unless `force` is set) (§4.10).
    ///
    /// Returns `None` when nothing was compressed, `Some(record)` otherwise.
    pub async fn try_compress(
        &self,
        force: bool,
    ) -> Result<Option<relay_history::CompressionRecord>, HistoryError> {
        let model = self.current_model();
        let curated = self.history.lock().await.curated();
        if curated.is_empty() {
            return Ok(None);
        }

        if !force {
            let token_count = self
                .generator
                .count_tokens(&model, &curated)
                .await
                .map_err(HistoryError::Generator)?;
            let threshold =
                (self.config.context_token_limit as f64 * self.config.compression_threshold) as usize;
            if token_count <= threshold {
                return Ok(None);
            }
        }

        match relay_history::compress(self.generator.as_ref(), &model, &curated).await? {
            Some((new_log, record)) => {
                self.history.lock().await.replace(new_log);
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream};
    use relay_proto::{AuthKind, FinishReason, GenerateResponse, TokenUsage};
    use relay_types::Part;
    use std::sync::Mutex as StdMutex;

    struct ScriptedGenerator {
        auth: AuthKind,
        replies: StdMutex<Vec<Vec<Result<GenerateResponse, GeneratorError>>>>,
    }

    impl ScriptedGenerator {
        fn new(auth: AuthKind, replies: Vec<Vec<Result<GenerateResponse, GeneratorError>>>) -> Self {
            Self {
                auth,
                replies: StdMutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl ContentGenerator for ScriptedGenerator {
        fn auth_kind(&self) -> AuthKind {
            self.auth
        }

        async fn generate(&self, _request: GenerateRequest) -> Result<GenerateResponse, GeneratorError> {
            unimplemented!("session drives generate_stream only")
        }

        fn generate_stream(
            &self,
            _request: GenerateRequest,
        ) -> BoxStream<'static, Result<GenerateResponse, GeneratorError>> {
            let mut replies = self.replies.lock().expect("poisoned");
            let next = if replies.is_empty() {
                Vec::new()
            } else {
                replies.remove(0)
            };
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

    fn assembler() -> PromptAssembler {
        PromptAssembler::new(relay_prompt::PromptAssemblerConfig {
            config_dir: std::env::temp_dir().join("relay-session-test-config"),
            ..Default::default()
        })
    }

    fn session_with(generator: ScriptedGenerator, config: ChatSessionConfig) -> ChatSession {
        ChatSession::new(
            Arc::new(generator),
            assembler(),
            Arc::new(ToolRegistry::new()),
            config,
        )
    }

    #[tokio::test]
    async fn successful_turn_folds_one_model_entry_into_history() {
        let generator = ScriptedGenerator::new(
            AuthKind::ApiKey,
            vec![vec![ok_chunk("hello there", FinishReason::Stop)]],
        );
        let session = session_with(
            generator,
            ChatSessionConfig {
                primary_model: "primary".to_string(),
                ..Default::default()
            },
        );

        let result = session
            .send_message(
                Path::new("/tmp"),
                vec![Part::text("hi")],
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.model_used, "primary");
        assert!(!result.model_switched_this_turn);

        let raw = session.raw_history().await;
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].role, Role::User);
        assert_eq!(raw[1].role, Role::Model);
    }

    #[tokio::test]
    async fn persistent_rate_limit_switches_to_fallback_once() {
        let generator = ScriptedGenerator::new(
            AuthKind::OAuthPersonal,
            vec![
                vec![Err(GeneratorError::Transient {
                    message: "rate limited".to_string(),
                    retry_after: None,
                })],
                vec![Err(GeneratorError::Transient {
                    message: "rate limited".to_string(),
                    retry_after: None,
                })],
                vec![ok_chunk("from the fallback", FinishReason::Stop)],
            ],
        );
        let session = session_with(
            generator,
            ChatSessionConfig {
                primary_model: "primary".to_string(),
                fallback_model: Some("fallback".to_string()),
                backoff: crate::retry::BackoffPolicy {
                    max_attempts: 2,
                    initial_delay: std::time::Duration::from_millis(1),
                    max_delay: std::time::Duration::from_millis(5),
                },
                ..Default::default()
            },
        );

        let result = session
            .send_message(
                Path::new("/tmp"),
                vec![Part::text("hi")],
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(result.model_used, "fallback");
        assert!(result.model_switched_this_turn);
        assert!(session.model_switched_during_session());
    }

    #[tokio::test]
    async fn fallback_ineligible_auth_kind_never_switches() {
        let generator = ScriptedGenerator::new(
            AuthKind::ApiKey,
            vec![vec![Err(GeneratorError::Transient {
                message: "rate limited".to_string(),
                retry_after: None,
            })]],
        );
        let session = session_with(
            generator,
            ChatSessionConfig {
                primary_model: "primary".to_string(),
                fallback_model: Some("fallback".to_string()),
                backoff: crate::retry::BackoffPolicy {
                    max_attempts: 1,
                    initial_delay: std::time::Duration::from_millis(1),
                    max_delay: std::time::Duration::from_millis(5),
                },
                ..Default::default()
            },
        );

        let err = session
            .send_message(
                Path::new("/tmp"),
                vec![Part::text("hi")],
                CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::Generator(_)));
        assert!(!session.model_switched_during_session());
    }

    #[tokio::test]
    async fn quota_exhausted_on_fallback_goes_sticky() {
        let generator = ScriptedGenerator::new(
            AuthKind::OAuthPersonal,
            vec![
                vec![Err(GeneratorError::QuotaExhausted)],
                vec![Err(GeneratorError::QuotaExhausted)],
            ],
        );
        let session = session_with(
            generator,
            ChatSessionConfig {
                primary_model: "primary".to_string(),
                ..Default::default()
            },
        );

        let err = session
            .send_message(
                Path::new("/tmp"),
                vec![Part::text("hi")],
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::QuotaSticky));

        // A tool-result continuation is not a new top-level prompt: it
        // stays refused.
        let second = session
            .continue_with_tool_results(
                Path::new("/tmp"),
                vec![Part::text("tool output")],
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(second, SessionError::QuotaSticky));

        // A genuinely new top-level prompt clears the sticky flag and
        // tries again.
        let third = session
            .send_message(
                Path::new("/tmp"),
                vec![Part::text("another try")],
                CancellationToken::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(third, SessionError::QuotaSticky));
    }

    #[tokio::test]
    async fn already_cancelled_token_is_rejected_before_any_call() {
        let generator = ScriptedGenerator::new(AuthKind::ApiKey, vec![]);
        let session = session_with(
            generator,
            ChatSessionConfig {
                primary_model: "primary".to_string(),
                ..Default::default()
            },
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = session
            .send_message(Path::new("/tmp"), vec![Part::text("hi")], cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Cancelled));
    }
}
