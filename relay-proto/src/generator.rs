//! The `ContentGenerator` protocol boundary (§4.1).

use async_trait::async_trait;
use futures::stream::BoxStream;
use relay_types::{Content, GeneratorError, ToolMeta};
use serde::{Deserialize, Serialize};

/// Which credential mechanism backs a `ContentGenerator` instance.
///
/// The fallback-model hook (§4.1) only fires for `OAuthPersonal` — API-key
/// and service-account auth skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// A long-lived API key.
    ApiKey,
    /// A personal OAuth session (subject to the fallback-model hook).
    OAuthPersonal,
    /// A Vertex AI service account.
    VertexServiceAccount,
}

impl AuthKind {
    /// Whether this auth kind participates in the fallback-model hook.
    pub fn supports_fallback(self) -> bool {
        matches!(self, AuthKind::OAuthPersonal)
    }
}

/// How the model should choose among declared tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum ToolChoice {
    /// Model decides freely whether to call a tool.
    #[default]
    Auto,
    /// Model must not call any tool.
    None,
    /// Model must call at least one tool.
    Required,
}

/// Per-call generation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Cap on output tokens for this call.
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Tool selection strategy.
    pub tool_choice: ToolChoice,
}

/// A full request to a `ContentGenerator`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier.
    pub model: String,
    /// The conversation so far, including the newest user turn.
    pub contents: Vec<Content>,
    /// System instruction assembled by `relay-prompt`.
    pub system_instruction: Option<String>,
    /// Tool declarations the model may call.
    pub tools: Vec<ToolMeta>,
    /// Per-call options.
    pub config: GenerateConfig,
}

impl GenerateRequest {
    /// Build a request with no tools and default config.
    pub fn new(model: impl Into<String>, contents: Vec<Content>) -> Self {
        Self {
            model: model.into(),
            contents,
            system_instruction: None,
            tools: Vec::new(),
            config: GenerateConfig::default(),
        }
    }
}

/// Why generation stopped.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop.
    Stop,
    /// Hit the output token cap.
    MaxTokens,
    /// Stopped to let the caller run tool calls.
    ToolUse,
    /// Anything else the backend reports, passed through verbatim.
    Other(String),
}

/// Token accounting for one call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    pub input_tokens: u64,
    /// Tokens in the completion.
    pub output_tokens: u64,
}

/// One (possibly partial) response from a `ContentGenerator` call.
///
/// `generateStream` yields a sequence of these; the last one carries
/// `finish_reason: Some(_)`. `generate` returns exactly one with
/// `finish_reason` always set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Parts produced so far by this (partial) response.
    pub parts: Vec<relay_types::Part>,
    /// Set on the terminal response.
    pub finish_reason: Option<FinishReason>,
    /// Usage for this call; zeroed on partials, set on the terminal chunk.
    pub usage: TokenUsage,
}

/// The content-generator boundary: a polymorphic sink/source for model calls.
///
/// Implementations exist per auth/backend variant (API key, OAuth personal,
/// Vertex service account); callers are generic over this trait and never
/// branch on the concrete backend.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Which auth mechanism this instance uses.
    fn auth_kind(&self) -> AuthKind;

    /// Non-streaming completion. May return `FunctionCall` parts.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GeneratorError>;

    /// Streaming completion. Each yielded item is a partial response; the
    /// consumer accumulates them (see `relay-turn`).
    fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> BoxStream<'static, Result<GenerateResponse, GeneratorError>>;

    /// Count tokens for a content sequence under the given model.
    async fn count_tokens(&self, model: &str, contents: &[Content]) -> Result<usize, GeneratorError>;

    /// Embed a batch of texts. The returned vector count MUST equal the
    /// input count — implementations that can't guarantee this return
    /// `GeneratorError::EmbeddingCountMismatch`.
    async fn embed(&self, model: &str, texts: Vec<String>) -> Result<Vec<Vec<f32>>, GeneratorError>;
}
