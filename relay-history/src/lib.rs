#![deny(missing_docs)]
//! Chat history storage, curation, and lossy compaction.
//!
//! `HistoryStore` owns the raw append-only log. `curate` derives the
//! model-facing view by dropping dead exchanges. `compress` replaces the
//! oldest portion of a curated log with a synthetic summary when it grows
//! past budget.

pub mod compress;
pub mod curate;
pub mod store;

pub use compress::{compress, find_split_index, CompressionRecord};
pub use curate::curate;
pub use store::HistoryStore;
