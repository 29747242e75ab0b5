#![deny(missing_docs)]
//! Protocol traits for the relay agent runtime.
//!
//! Two boundaries live here: [`generator::ContentGenerator`] (the model
//! backend) and [`token_counter::TokenCounter`] (reusable token accounting).
//! Everything downstream of this crate is generic over these traits —
//! no crate above this one branches on a concrete backend.

pub mod cancel;
pub mod generator;
pub mod token_counter;

pub use cancel::CancellationToken;
pub use generator::{
    AuthKind, ContentGenerator, FinishReason, GenerateConfig, GenerateRequest, GenerateResponse,
    TokenUsage, ToolChoice,
};
pub use token_counter::TokenCounter;
