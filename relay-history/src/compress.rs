//! Lossy history compaction (§4.10).
//!
//! Splits the curated log at a point chosen by accumulated character
//! weight (a deliberate proxy for token count, not an accurate one — see
//! the split-point note on [`find_split_index`]), summarizes everything
//! before the split, and keeps everything from the split onward verbatim.

use relay_proto::{ContentGenerator, GenerateRequest};
use relay_types::{Content, HistoryError, Part, Role};

const SUMMARY_PREAMBLE: &str = "This is a summary of the conversation so far, \
    provided to preserve context after older turns were compacted out:";

const SNAPSHOT_ACK_TEXT: &str = "Got it. Thanks for the additional context!";

/// Record of one compaction, kept for diagnostics/telemetry.
#[derive(Debug, Clone)]
pub struct CompressionRecord {
    /// Character weight of the turns that were summarized away.
    pub original_tokens: usize,
    /// Character weight of the synthetic summary pair that replaced them.
    pub new_tokens: usize,
    /// The synthetic `user` summary entry that now stands in for them.
    pub summary_content: Content,
}

/// Find the index at or after which curated entries are kept verbatim.
///
/// Walks forward accumulating [`Content::char_weight`] until at least 70%
/// of the total weight has been consumed, then advances to the next
/// entry that is a `user` turn whose first part is *not* a
/// `FunctionResponse` — splitting in the middle of a function-call round
/// trip would hand the model a dangling `FunctionResponse` with no
/// matching `FunctionCall` in its new context.
///
/// This is intentionally a character-count heuristic, not a real token
/// count: see the open question this resolves in the design notes.
pub fn find_split_index(curated: &[Content]) -> usize {
    if curated.is_empty() {
        return 0;
    }

    let total: usize = curated.iter().map(Content::char_weight).sum();
    let target = total * 7 / 10;

    let mut acc = 0usize;
    let mut split = curated.len();
    for (index, content) in curated.iter().enumerate() {
        acc += content.char_weight();
        if acc >= target {
            split = index + 1;
            break;
        }
    }

    while split < curated.len() {
        let candidate = &curated[split];
        let starts_with_function_response = candidate
            .parts
            .first()
            .map(Part::is_function_response)
            .unwrap_or(false);
        if candidate.role == Role::User && !starts_with_function_response {
            break;
        }
        split += 1;
    }

    split
}

/// Summarize `curated[..split]` via `generator` and splice the result back
/// in as a synthetic snapshot/acknowledgement `Content` pair, followed by
/// `curated[split..]` verbatim.
///
/// Returns `None` if `split` is `0` or `curated.len()` — there is nothing
/// worth compacting.
pub async fn compress(
    generator: &dyn ContentGenerator,
    model: &str,
    curated: &[Content],
) -> Result<Option<(Vec<Content>, CompressionRecord)>, HistoryError> {
    let split = find_split_index(curated);
    if split == 0 || split >= curated.len() {
        return Ok(None);
    }

    let (to_summarize, tail) = curated.split_at(split);
    let original_tokens: usize = to_summarize.iter().map(Content::char_weight).sum();

    let mut request_contents = to_summarize.to_vec();
    request_contents.push(Content::user_text(
        "Summarize the conversation above concisely, in third person, preserving \
         decisions made, facts established, and outcomes of tool calls.",
    ));
    let request = GenerateRequest::new(model, request_contents);

    let response = generator
        .generate(request)
        .await
        .map_err(HistoryError::Generator)?;

    let summary_text = response
        .parts
        .iter()
        .filter_map(|p| match p {
            Part::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    let summary_content = Content::user_text(format!("{SUMMARY_PREAMBLE}\n{summary_text}"));
    let ack_content = Content::model_text(SNAPSHOT_ACK_TEXT);

    let new_tokens = summary_content.char_weight() + ack_content.char_weight();

    let mut new_log = Vec::with_capacity(2 + tail.len());
    new_log.push(summary_content.clone());
    new_log.push(ack_content);
    new_log.extend_from_slice(tail);

    let record = CompressionRecord {
        original_tokens,
        new_tokens,
        summary_content,
    };

    Ok(Some((new_log, record)))
}
