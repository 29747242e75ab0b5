//! Cancellation propagation (§5).
//!
//! A single cancel handle flows from the caller down into the model
//! stream, each executing tool, the confirmation wait, and the editor
//! bridge. Every suspension point must poll it.

/// Re-exported so downstream crates don't need their own `tokio-util` pin.
pub use tokio_util::sync::CancellationToken;
