#![deny(missing_docs)]
//! `ChatSession`: the per-conversation object that owns history, the
//! generator, and prompt assembly, and serializes `sendMessage` calls
//! (§4.9).

pub mod config;
pub mod error;
pub mod retry;
pub mod session;
pub mod turn;

pub use config::ChatSessionConfig;
pub use error::SessionError;
pub use retry::BackoffPolicy;
pub use session::{ChatSession, SendResult};
pub use turn::{drain, DrainedTurn, PendingToolCall, TurnOutcome};
