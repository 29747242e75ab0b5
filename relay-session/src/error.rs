//! Errors `ChatSession::send_message` can surface (§7).

use relay_types::{ConfigError, GeneratorError, HistoryError, LoopError};

/// Failure modes of one `sendMessage` call.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The generator failed and retries (and, if eligible, the fallback
    /// model) were exhausted.
    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),
    /// History compression failed.
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    /// System-instruction assembly failed (missing override file, I/O error).
    #[error("prompt assembly failed: {0}")]
    Config(#[from] ConfigError),
    /// Quota was exhausted on the fallback model; sticky until a new
    /// top-level prompt (§7 `QuotaExhausted`).
    #[error("quota exhausted; submit a new prompt to retry")]
    QuotaSticky,
    /// The caller's cancellation token fired before the turn finished.
    #[error("cancelled")]
    Cancelled,
}

impl From<SessionError> for LoopError {
    /// Lift a per-send failure into the prompt-level taxonomy the outer
    /// agent driver returns (`relay-agent`).
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Generator(error) => LoopError::Generator(error),
            SessionError::History(error) => LoopError::History(error),
            SessionError::Config(error) => LoopError::Config(error),
            SessionError::QuotaSticky => LoopError::QuotaSticky,
            SessionError::Cancelled => LoopError::Cancelled,
        }
    }
}
