//! The `TokenCounter` boundary — count tokens for a content sequence
//! under a given model, independent of which `ContentGenerator` is active.

use crate::generator::ContentGenerator;
use async_trait::async_trait;
use relay_types::{Content, GeneratorError};

/// Counts tokens for a content sequence under a given model.
///
/// Kept as its own trait (rather than folded into `ContentGenerator`) so
/// that `relay-history`'s compression check and `relay-agent`'s per-turn
/// accounting can depend on token counting alone, without pulling in the
/// full generate/stream/embed surface.
#[async_trait]
pub trait TokenCounter: Send + Sync {
    /// Count tokens for `contents` under `model`.
    async fn count_tokens(&self, model: &str, contents: &[Content]) -> Result<usize, GeneratorError>;
}

/// Any `ContentGenerator` is trivially a `TokenCounter`.
#[async_trait]
impl<G: ContentGenerator> TokenCounter for G {
    async fn count_tokens(&self, model: &str, contents: &[Content]) -> Result<usize, GeneratorError> {
        ContentGenerator::count_tokens(self, model, contents).await
    }
}
