//! Call-id generation and fingerprinting (§4.5, §4.4).

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Build the synthetic call id used when the model omits one: `{name}-{epoch}-{rand}`.
///
/// Pure — callers supply the epoch and random suffix so the format can be
/// unit tested without depending on wall-clock time or a PRNG.
pub fn format_call_id(name: &str, epoch_millis: u128, rand_suffix: u32) -> String {
    format!("{name}-{epoch_millis}-{rand_suffix:08x}")
}

/// Generate a fresh call id using the real clock and a random suffix.
pub fn generate_call_id(name: &str) -> String {
    let epoch_millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let rand_suffix: u32 = rand::random();
    format_call_id(name, epoch_millis, rand_suffix)
}

/// A compact, order-independent hash of an arguments blob, used to build
/// `(toolName, argsHash)` loop-detector fingerprints without retaining the
/// full (possibly large) argument payload.
pub fn hash_args(args: &serde_json::Value) -> String {
    let serialized = serde_json::to_string(args).unwrap_or_default();
    hash_text(&serialized)
}

/// Hex-encoded SHA-256 of arbitrary text, used for text-chunk fingerprints.
pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
