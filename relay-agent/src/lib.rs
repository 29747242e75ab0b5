#![deny(missing_docs)]
//! `AgentLoop`: the outer driver for one top-level prompt (§4.9).
//!
//! Wires `relay-session`'s retry/fallback/history discipline,
//! `relay-scheduler`'s tool-call lifecycle, and `relay-loopguard`'s
//! repetition detector into the single operation most callers actually
//! want — "run this prompt, including any tool calls and model-initiated
//! continuations, to completion."

pub mod agent;
pub mod approval;
pub mod config;
pub mod next_speaker;

pub use agent::{AgentLoop, AgentOutcome};
pub use approval::ApprovalResolver;
pub use config::{AgentLoopConfig, ApprovalMode, CursorPosition, IdeContext};
pub use next_speaker::NextSpeaker;
