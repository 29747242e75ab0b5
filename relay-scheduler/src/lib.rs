#![deny(missing_docs)]
//! Tool-call scheduling: validate → confirm → execute → complete (§4.7).
//!
//! [`Scheduler`] owns the lifecycle of one batch of tool calls requested
//! by a single model turn. It does not decide *whether* a call should
//! confirm — that's the tool's own [`relay_tool::ToolDescriptor::should_confirm`]
//! — only how the batch moves through validation, confirmation, execution,
//! and completion as a unit.

pub mod canon;
pub mod error;
pub mod scheduler;
pub mod state;

pub use canon::canonicalize;
pub use error::SchedulerError;
pub use scheduler::Scheduler;
pub use state::{ToolCallRequest, ToolCallState, ToolCallStatus};
