#![deny(missing_docs)]
//! A scripted [`ContentGenerator`] for tests across the workspace (§4.1).
//!
//! Replaces the ad hoc scripted generators each crate's own test module
//! would otherwise hand-roll: queue up the replies a test expects the
//! backend to give, in order, and hand the generator to a `ChatSession`
//! or `AgentLoop` like any other implementation.

mod helpers;

use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use relay_proto::{AuthKind, ContentGenerator, GenerateRequest, GenerateResponse};
use relay_types::{Content, GeneratorError};

pub use helpers::{final_chunk, ok_chunk, text_response, tool_call_chunk, tool_call_response};

/// A `ContentGenerator` whose replies are scripted ahead of time.
///
/// `generate` (one-shot calls — summarization, the next-speaker probe) and
/// `generate_stream` (the normal turn path) draw from separate queues, since
/// a test script for one says nothing about the other. Each call records
/// the request it was given, for assertions on what a caller actually sent.
pub struct MockGenerator {
    auth_kind: AuthKind,
    generate_replies: StdMutex<Vec<Result<GenerateResponse, GeneratorError>>>,
    stream_replies: StdMutex<Vec<Vec<Result<GenerateResponse, GeneratorError>>>>,
    requests: StdMutex<Vec<GenerateRequest>>,
    embeddings: StdMutex<Option<Vec<Vec<f32>>>>,
    token_count: StdMutex<usize>,
}

impl MockGenerator {
    /// A generator with no scripted replies; chain the `with_*` builders
    /// before handing it to a session.
    pub fn new(auth_kind: AuthKind) -> Self {
        Self {
            auth_kind,
            generate_replies: StdMutex::new(Vec::new()),
            stream_replies: StdMutex::new(Vec::new()),
            requests: StdMutex::new(Vec::new()),
            embeddings: StdMutex::new(None),
            token_count: StdMutex::new(0),
        }
    }

    /// Queue one reply for the next `generate` call.
    pub fn with_generate_reply(self, reply: Result<GenerateResponse, GeneratorError>) -> Self {
        self.generate_replies.lock().expect("poisoned").push(reply);
        self
    }

    /// Queue one batch of streamed chunks for the next `generate_stream` call.
    pub fn with_stream_reply(self, batch: Vec<Result<GenerateResponse, GeneratorError>>) -> Self {
        self.stream_replies.lock().expect("poisoned").push(batch);
        self
    }

    /// Fix the value `count_tokens` returns for every call.
    pub fn with_token_count(self, count: usize) -> Self {
        *self.token_count.lock().expect("poisoned") = count;
        self
    }

    /// Fix the value `embed` returns for every call, instead of the default
    /// one-dimensional stub vector per input text.
    pub fn with_embeddings(self, vectors: Vec<Vec<f32>>) -> Self {
        *self.embeddings.lock().expect("poisoned") = Some(vectors);
        self
    }

    /// Every request this generator has been asked to handle, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().expect("poisoned").clone()
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    fn auth_kind(&self) -> AuthKind {
        self.auth_kind
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, GeneratorError> {
        self.requests.lock().expect("poisoned").push(request);
        let mut replies = self.generate_replies.lock().expect("poisoned");
        if replies.is_empty() {
            panic!("MockGenerator: no more scripted `generate` replies");
        }
        replies.remove(0)
    }

    fn generate_stream(
        &self,
        request: GenerateRequest,
    ) -> BoxStream<'static, Result<GenerateResponse, GeneratorError>> {
        self.requests.lock().expect("poisoned").push(request);
        let mut replies = self.stream_replies.lock().expect("poisoned");
        if replies.is_empty() {
            panic!("MockGenerator: no more scripted `generate_stream` replies");
        }
        Box::pin(stream::iter(replies.remove(0)))
    }

    async fn count_tokens(&self, _model: &str, _contents: &[Content]) -> Result<usize, GeneratorError> {
        Ok(*self.token_count.lock().expect("poisoned"))
    }

    async fn embed(&self, _model: &str, texts: Vec<String>) -> Result<Vec<Vec<f32>>, GeneratorError> {
        match self.embeddings.lock().expect("poisoned").clone() {
            Some(vectors) => Ok(vectors),
            None => Ok(texts.iter().map(|_| vec![0.0]).collect()),
        }
    }
}
