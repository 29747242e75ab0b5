#![deny(missing_docs)]
//! System-instruction assembly (§4.2): base template ⊕ runtime facts ⊕
//! user memory, plus the user-memory file's append operation (§6).

pub mod assembler;
pub mod facts;
pub mod memory;
pub mod source;
pub mod template;

pub use assembler::{PromptAssembler, PromptAssemblerConfig};
pub use facts::RuntimeFacts;
pub use memory::{append_fact, DEFAULT_MEMORY_FILE_NAME, MEMORY_SECTION_HEADER};
pub use source::{expand_tilde, parse_toggle, OverrideSource};
pub use template::DEFAULT_TEMPLATE;
