#![deny(missing_docs)]
//! Tool descriptor contract, registry, and confirmation vocabulary.
//!
//! This crate defines what a tool *is* (`ToolDescriptor`), how the runtime
//! finds one by name (`ToolRegistry`), and the shapes exchanged with the
//! UI when a call needs human approval (`confirm`). It does not schedule
//! or execute calls — that lifecycle lives in `relay-scheduler`.

pub mod confirm;
pub mod descriptor;
pub mod registry;
pub mod sanitize;

pub use confirm::{ConfirmationContext, ConfirmationDetails, ConfirmationOutcome, ConfirmationPayload};
pub use descriptor::{
    LlmContent, ModifyContext, ProgressReporter, ProgressSink, ReturnDisplay, ToolDescriptor,
    ToolExecutionResult,
};
pub use registry::{ToolDeclaration, ToolRegistry};
pub use sanitize::{is_valid_tool_name, qualify_name, sanitize_name, sanitize_schema};
