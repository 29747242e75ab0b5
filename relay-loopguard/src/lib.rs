#![deny(missing_docs)]
//! Repetition-loop detection (§4.4).
//!
//! Watches a bounded window of recent model output for the same text or
//! the same tool call recurring too many times and signals that the turn
//! should stop instead of spinning forever.

use relay_types::{hash_args, hash_text};
use std::collections::{HashMap, VecDeque};

/// Default ring-buffer capacity (entries considered "recent").
pub const DEFAULT_WINDOW: usize = 30;
/// Occurrences of the same text fingerprint within the window that count
/// as a loop.
pub const TEXT_THRESHOLD: usize = 5;
/// Occurrences of the same `(tool, args)` fingerprint within the window
/// that count as a loop.
pub const TOOL_CALL_THRESHOLD: usize = 3;

/// One observable model action, as seen by the loop guard.
#[derive(Debug, Clone)]
pub enum Signal<'a> {
    /// A chunk of model-generated text.
    Text(&'a str),
    /// A tool call the model requested.
    ToolCall {
        /// Tool name.
        name: &'a str,
        /// Call arguments.
        args: &'a serde_json::Value,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Kind {
    Text,
    ToolCall,
}

impl Kind {
    fn threshold(self) -> usize {
        match self {
            Kind::Text => TEXT_THRESHOLD,
            Kind::ToolCall => TOOL_CALL_THRESHOLD,
        }
    }
}

struct Entry {
    kind: Kind,
    fingerprint: String,
}

/// Bounded-window fingerprint repetition detector.
///
/// Call [`LoopDetector::observe`] once per model text chunk or tool call;
/// it returns `true` the moment a loop is confirmed. Call [`LoopDetector::reset`]
/// whenever a new prompt starts or the session resets — a detector is only
/// meaningful within a single prompt's turn.
pub struct LoopDetector {
    window: VecDeque<Entry>,
    capacity: usize,
    counts: HashMap<(Kind, String), usize>,
}

impl LoopDetector {
    /// A detector with the default window size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_WINDOW)
    }

    /// A detector with a custom window size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            counts: HashMap::new(),
        }
    }

    /// Record one signal and report whether it completes a loop.
    pub fn observe(&mut self, signal: Signal<'_>) -> bool {
        let (kind, fingerprint) = match signal {
            Signal::Text(text) => (Kind::Text, hash_text(text)),
            Signal::ToolCall { name, args } => {
                (Kind::ToolCall, hash_text(&format!("{name}:{}", hash_args(args))))
            }
        };

        if self.window.len() == self.capacity {
            if let Some(evicted) = self.window.pop_front() {
                self.decrement(evicted.kind, &evicted.fingerprint);
            }
        }

        let key = (kind, fingerprint.clone());
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        let loop_detected = *count >= kind.threshold();

        self.window.push_back(Entry { kind, fingerprint });

        if loop_detected {
            tracing::warn!(kind = ?kind, "repetition loop detected");
        }
        loop_detected
    }

    fn decrement(&mut self, kind: Kind, fingerprint: &str) {
        let key = (kind, fingerprint.to_string());
        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
    }

    /// Clear all state. Call on a new prompt id or session reset (§4.4).
    pub fn reset(&mut self) {
        self.window.clear();
        self.counts.clear();
    }
}

impl Default for LoopDetector {
    fn default() -> Self {
        Self::new()
    }
}
