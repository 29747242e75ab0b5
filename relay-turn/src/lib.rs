#![deny(missing_docs)]
//! The turn engine: demuxes one model stream into typed events.
//!
//! A "turn" is one `generate`/`generate_stream` round trip. [`TurnEngine`]
//! consumes the raw (already wire-decoded) response stream from a
//! `ContentGenerator` and emits [`TurnEvent`]s the scheduler and session
//! layers can act on without knowing anything about the underlying
//! backend's transport.

pub mod engine;
pub mod event;
pub mod thought;

pub use engine::{DebugBuffer, TurnEngine, DEFAULT_DEBUG_BUFFER};
pub use event::TurnEvent;
pub use thought::{parse_thought, Thought};
