#![deny(missing_docs)]
//! # relay — umbrella crate
//!
//! A single import surface for the agent runtime: the turn engine, tool
//! scheduler, chat history manager, and the `AgentLoop` driver that ties
//! them together. Re-exports the individual `relay-*` crates behind
//! feature flags, plus a [`prelude`] for the common path.

#[cfg(feature = "agent")]
pub use relay_agent;
#[cfg(feature = "core")]
pub use relay_history;
#[cfg(feature = "core")]
pub use relay_loopguard;
#[cfg(feature = "mock")]
pub use relay_provider_mock;
#[cfg(feature = "core")]
pub use relay_prompt;
#[cfg(feature = "core")]
pub use relay_proto;
#[cfg(feature = "core")]
pub use relay_scheduler;
#[cfg(feature = "core")]
pub use relay_session;
#[cfg(feature = "core")]
pub use relay_tool;
#[cfg(feature = "core")]
pub use relay_turn;
#[cfg(feature = "core")]
pub use relay_types;

/// Happy-path imports for driving the agent runtime.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use relay_proto::{
        AuthKind, CancellationToken, ContentGenerator, FinishReason, GenerateConfig,
        GenerateRequest, GenerateResponse, TokenCounter, TokenUsage, ToolChoice,
    };

    #[cfg(feature = "core")]
    pub use relay_types::{
        Content, ConfigError, GeneratorError, HistoryError, LoopError, Part, Role, ToolError,
        ToolKind, ToolMeta,
    };

    #[cfg(feature = "core")]
    pub use relay_tool::{
        ConfirmationDetails, ConfirmationOutcome, ConfirmationPayload, LlmContent, ModifyContext,
        ToolDescriptor, ToolExecutionResult, ToolRegistry,
    };

    #[cfg(feature = "core")]
    pub use relay_scheduler::{Scheduler, SchedulerError, ToolCallRequest, ToolCallState, ToolCallStatus};

    #[cfg(feature = "core")]
    pub use relay_loopguard::{LoopDetector, Signal};

    #[cfg(feature = "core")]
    pub use relay_history::{CompressionRecord, HistoryStore};

    #[cfg(feature = "core")]
    pub use relay_prompt::{PromptAssembler, PromptAssemblerConfig};

    #[cfg(feature = "core")]
    pub use relay_session::{ChatSession, ChatSessionConfig, SendResult};

    #[cfg(feature = "agent")]
    pub use relay_agent::{
        AgentLoop, AgentLoopConfig, AgentOutcome, ApprovalMode, ApprovalResolver, CursorPosition,
        IdeContext, NextSpeaker,
    };

    #[cfg(feature = "mock")]
    pub use relay_provider_mock::MockGenerator;
}
