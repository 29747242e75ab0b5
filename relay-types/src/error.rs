//! Error taxonomy shared by every crate in the runtime (§7).

use std::time::Duration;

/// Errors raised while building or loading configuration.
///
/// Fatal at startup — the caller should abort rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicit override path was given but the file does not exist.
    #[error("override file not found at explicit path: {0}")]
    MissingOverrideFile(String),
    /// A tool or provider was configured with unknown/invalid settings.
    #[error("unknown tool configuration: {0}")]
    UnknownTool(String),
    /// Any other configuration error.
    #[error("{0}")]
    Other(String),
}

/// Errors from the content-generator boundary (§4.1, §7).
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeneratorError {
    /// Credential invalid or expired. Never retried.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// Transient backend failure (429/5xx). Retried with backoff.
    #[error("transient backend error: {0}")]
    Transient {
        /// Human-readable detail.
        message: String,
        /// Suggested retry delay, if the backend provided one.
        retry_after: Option<Duration>,
    },
    /// Quota exhausted; session-sticky until a new top-level prompt.
    #[error("quota exhausted")]
    QuotaExhausted,
    /// Malformed request or response.
    #[error("invalid request or response: {0}")]
    InvalidRequest(String),
    /// Embedding call returned a vector count that didn't match the input count.
    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    EmbeddingCountMismatch {
        /// Number of input texts.
        expected: usize,
        /// Number of returned embeddings.
        actual: usize,
    },
    /// Any other generator error.
    #[error("{0}")]
    Other(String),
}

impl GeneratorError {
    /// Whether retrying this request might succeed (§4.1 retry policy).
    pub fn is_retryable(&self) -> bool {
        matches!(self, GeneratorError::Transient { .. })
    }

    /// Whether this is the persistent-rate-limit case that should trigger
    /// the fallback-model hook (§4.1, §7 `TransientBackendError`).
    pub fn is_persistent_rate_limit(&self, attempts: u32, max_attempts: u32) -> bool {
        matches!(self, GeneratorError::Transient { .. }) && attempts >= max_attempts
    }
}

/// Errors from tool validation and execution (§4.6, §7).
#[derive(Debug, Clone, thiserror::Error)]
pub enum ToolError {
    /// No tool registered under this name.
    #[error("tool not found: {0}")]
    NotFound(String),
    /// Arguments failed schema or tool-specific validation.
    #[error("invalid params: {0}")]
    ValidationFailed(String),
    /// The tool's own `execute` rejected.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    /// The call was cancelled before or during execution.
    #[error("cancelled")]
    Cancelled,
    /// The call exceeded its configured `timeoutMs`.
    #[error("timed out")]
    TimedOut,
}

/// Errors from history/compression operations.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Generator call during summarization failed.
    #[error("generator error during compression: {0}")]
    Generator(#[from] GeneratorError),
}

/// Terminal outcomes for a whole prompt, surfaced by `AgentLoop` (§7).
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    /// A `ContentGenerator` call failed and was not retried away.
    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),
    /// History/compression failed.
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    /// The session turn counter exceeded its configured cap.
    #[error("max session turns exceeded ({0})")]
    MaxSessionTurns(usize),
    /// The loop detector signalled runaway behavior.
    #[error("loop detected")]
    LoopDetected,
    /// System-instruction assembly failed.
    #[error("prompt assembly failed: {0}")]
    Config(#[from] ConfigError),
    /// Quota was exhausted on the fallback model; sticky until a new
    /// top-level prompt (§7 `QuotaExhausted`).
    #[error("quota exhausted; submit a new prompt to retry")]
    QuotaSticky,
    /// A tool-scheduling failure the driver could not recover from — a
    /// double-schedule bug, an unknown call id, or similar internal
    /// misuse of the scheduler, as opposed to a per-call tool failure
    /// (which stays call-scoped and never reaches this far).
    #[error("tool scheduling error: {0}")]
    Scheduler(String),
    /// The caller's cancellation token fired.
    #[error("cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_error_retryable() {
        let transient = GeneratorError::Transient {
            message: "rate limited".into(),
            retry_after: Some(Duration::from_secs(1)),
        };
        assert!(transient.is_retryable());
        assert!(!GeneratorError::Auth("bad key".into()).is_retryable());
    }

    #[test]
    fn persistent_rate_limit_threshold() {
        let transient = GeneratorError::Transient {
            message: "rate limited".into(),
            retry_after: None,
        };
        assert!(!transient.is_persistent_rate_limit(1, 3));
        assert!(transient.is_persistent_rate_limit(3, 3));
    }
}
