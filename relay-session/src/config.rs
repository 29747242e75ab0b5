//! Static configuration for a [`crate::ChatSession`] (§4.9).

use crate::retry::BackoffPolicy;

/// Configuration a `ChatSession` is built with.
///
/// Per-request overrides (model, max output tokens) are carried on each
/// `GenerateRequest`; this struct holds the session-lifetime defaults.
pub struct ChatSessionConfig {
    /// Model used until (and unless) the fallback hook switches it.
    pub primary_model: String,
    /// Lighter-weight model substituted after persistent rate-limiting on
    /// the primary, for backends whose `AuthKind::supports_fallback()`.
    pub fallback_model: Option<String>,
    /// Retry/backoff policy applied to transient generator errors.
    pub backoff: BackoffPolicy,
    /// The primary model's context window, in tokens, used to decide when
    /// to compress (§4.10).
    pub context_token_limit: usize,
    /// Fraction of `context_token_limit` that triggers compression.
    pub compression_threshold: f64,
}

impl Default for ChatSessionConfig {
    fn default() -> Self {
        Self {
            primary_model: String::new(),
            fallback_model: None,
            backoff: BackoffPolicy::default(),
            context_token_limit: 1_000_000,
            compression_threshold: 0.7,
        }
    }
}
