//! Configuration for an [`crate::agent::AgentLoop`] (§4.9).

use std::sync::Arc;

use crate::approval::ApprovalResolver;

/// How the loop resolves tool calls that require confirmation.
///
/// `relay_scheduler::Scheduler` has no built-in bypass for confirmation —
/// it always consults `ToolDescriptor::should_confirm` — so this policy
/// lives at the driver layer instead.
#[derive(Clone)]
pub enum ApprovalMode {
    /// Consult a pluggable resolver (e.g. a CLI prompt) for every
    /// `AwaitingApproval` call.
    Interactive(Arc<dyn ApprovalResolver>),
    /// Auto-approve every `AwaitingApproval` call with `ProceedOnce`,
    /// bypassing confirmation entirely.
    Yolo,
}

/// IDE-mode context to inject as additional first parts on the first
/// `send_message` call of a prompt (§6, §9 step 4).
#[derive(Debug, Clone, Default)]
pub struct IdeContext {
    /// Path of the file the user was most recently looking at.
    pub active_file: Option<String>,
    /// Cursor position within `active_file`, if known.
    pub cursor: Option<CursorPosition>,
    /// Currently selected text in `active_file`, if any.
    pub selected_text: Option<String>,
    /// Recently opened files, most recent first.
    pub recent_files: Vec<String>,
}

/// A one-based line/character cursor position.
#[derive(Debug, Clone, Copy)]
pub struct CursorPosition {
    /// Line number.
    pub line: u32,
    /// Character offset within the line.
    pub character: u32,
}

impl IdeContext {
    /// Whether there is anything to inject.
    pub fn is_empty(&self) -> bool {
        self.active_file.is_none() && self.selected_text.is_none() && self.recent_files.is_empty()
    }

    /// Render the single text block described in §6, or `None` if there is
    /// nothing to say.
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut sections = Vec::new();

        if let Some(path) = &self.active_file {
            sections.push(format!(
                "This is the file that the user was most recently looking at:\n- Path: {path}"
            ));
        }
        if let Some(cursor) = &self.cursor {
            sections.push(format!(
                "This is the cursor position in the file:\n- Cursor Position: Line {}, Character {}",
                cursor.line, cursor.character
            ));
        }
        if let Some(selected) = &self.selected_text {
            sections.push(format!("This is the selected text in the active file:\n- {selected}"));
        }
        if !self.recent_files.is_empty() {
            let list: String = self
                .recent_files
                .iter()
                .map(|path| format!("- {path}"))
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(format!(
                "Here are files the user has recently opened, with the most recent at the top:\n{list}"
            ));
        }

        Some(sections.join("\n\n"))
    }
}

/// Configuration an [`crate::agent::AgentLoop`] is built with.
pub struct AgentLoopConfig {
    /// Hard cap on turns within one session; exceeding it ends the prompt
    /// with `LoopError::MaxSessionTurns` (§4.9 step 2).
    pub max_session_turns: usize,
    /// How to resolve tool calls awaiting confirmation.
    pub approval_mode: ApprovalMode,
    /// IDE context to inject ahead of the first turn of a prompt, when set.
    pub ide_context: Option<IdeContext>,
}

impl Default for AgentLoopConfig {
    /// `Interactive` needs a caller-supplied resolver, so there's no
    /// sensible default for it; callers that want the default to require
    /// no wiring get `Yolo` and must opt into `Interactive` explicitly.
    fn default() -> Self {
        Self {
            max_session_turns: 100,
            approval_mode: ApprovalMode::Yolo,
            ide_context: None,
        }
    }
}
