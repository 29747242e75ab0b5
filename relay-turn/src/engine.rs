//! The turn engine: drives one `generate_stream` call and demuxes its
//! output into [`TurnEvent`]s (§4.2).

use crate::event::TurnEvent;
use crate::thought::parse_thought;
use futures::stream::BoxStream;
use futures::StreamExt;
use relay_proto::{CancellationToken, ContentGenerator, GenerateRequest, GenerateResponse};
use relay_types::{generate_call_id, Content, Part, Role};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Default capacity of the raw-partial debug buffer.
pub const DEFAULT_DEBUG_BUFFER: usize = 100;

/// Bounded ring buffer of raw partial responses, kept for inspecting a
/// malformed stream after the fact.
#[derive(Clone)]
pub struct DebugBuffer {
    inner: Arc<Mutex<VecDeque<GenerateResponse>>>,
    capacity: usize,
}

impl DebugBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    fn record(&self, response: &GenerateResponse) {
        let mut buffer = self.inner.lock().expect("debug buffer mutex poisoned");
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(response.clone());
    }

    /// Snapshot of the retained partials, oldest first.
    pub fn snapshot(&self) -> Vec<GenerateResponse> {
        self.inner
            .lock()
            .expect("debug buffer mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

/// Drives a single `ContentGenerator::generate_stream` call.
///
/// The engine does not retry or fall back on error — that policy lives one
/// layer up, in `relay-session`, which is the only place that knows
/// whether this backend's `AuthKind` supports a fallback model. Here, a
/// `GeneratorError::Auth` and any other error are both terminal: they stop
/// the stream and surface as [`TurnEvent::Error`] identically. The
/// distinction between auth and transient errors only matters to the
/// caller deciding *what to do next*, not to the engine producing events.
pub struct TurnEngine {
    debug_buffer: DebugBuffer,
}

impl TurnEngine {
    /// An engine with the default debug buffer size.
    pub fn new() -> Self {
        Self::with_debug_capacity(DEFAULT_DEBUG_BUFFER)
    }

    /// An engine with a custom debug buffer size.
    pub fn with_debug_capacity(capacity: usize) -> Self {
        Self {
            debug_buffer: DebugBuffer::new(capacity),
        }
    }

    /// The most recent raw partials retained for debugging a malformed
    /// stream, oldest first.
    pub fn debug_partials(&self) -> Vec<GenerateResponse> {
        self.debug_buffer.snapshot()
    }

    /// Run one turn, returning a stream of demuxed events.
    ///
    /// Polling stops as soon as `cancel` fires, a terminal
    /// `finish_reason` arrives, or the underlying stream yields an error.
    pub fn run(
        &self,
        generator: &dyn ContentGenerator,
        request: GenerateRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, TurnEvent> {
        let mut upstream = generator.generate_stream(request);
        let debug_buffer = self.debug_buffer.clone();

        Box::pin(async_stream::stream! {
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        yield TurnEvent::UserCancelled;
                        return;
                    }
                    item = upstream.next() => item,
                };

                let response = match next {
                    None => return,
                    Some(Err(error)) => {
                        yield TurnEvent::Error(error);
                        return;
                    }
                    Some(Ok(response)) => response,
                };

                debug_buffer.record(&response);

                for part in &response.parts {
                    if let Some(event) = translate_part(part) {
                        yield event;
                    }
                }

                if let Some(reason) = response.finish_reason {
                    yield TurnEvent::Finished(reason);
                    return;
                }
            }
        })
    }
}

impl Default for TurnEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn translate_part(part: &Part) -> Option<TurnEvent> {
    match part {
        Part::Thought { text } => Some(TurnEvent::Thought(parse_thought(text))),
        Part::FunctionCall { id, name, args } => {
            let call_id = if id.is_empty() {
                generate_call_id(name)
            } else {
                id.clone()
            };
            Some(TurnEvent::ToolCallRequest {
                call_id,
                name: name.clone(),
                args: args.clone(),
            })
        }
        Part::Text { text } if text.is_empty() => None,
        other => Some(TurnEvent::Content(Content {
            role: Role::Model,
            parts: vec![other.clone()],
        })),
    }
}
