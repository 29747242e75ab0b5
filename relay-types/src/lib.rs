#![deny(missing_docs)]
//! Core content, tool-metadata, and error types shared across the relay
//! agent runtime.
//!
//! This crate has no async runtime dependency and no knowledge of any
//! particular model backend — it is the common vocabulary that
//! `relay-proto`, `relay-tool`, `relay-history`, `relay-turn`,
//! `relay-scheduler`, `relay-prompt`, `relay-session`, and `relay-agent`
//! all build on.

pub mod content;
pub mod error;
pub mod id;
pub mod tool;

pub use content::{Content, Part, Role};
pub use error::{ConfigError, GeneratorError, HistoryError, LoopError, ToolError};
pub use id::{format_call_id, generate_call_id, hash_args, hash_text};
pub use tool::{ToolKind, ToolMeta};
