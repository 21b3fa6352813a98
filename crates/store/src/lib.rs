//! Persistent stores for CO-PRESENCE.
//!
//! Everything here is file-backed and single-writer: the artifact log and
//! content pool as append-only JSONL, profiles as small JSON documents, and
//! per-agent retrieval indexes.

mod jsonl;

pub mod artifact_log;
pub mod content_pool;
pub mod keyword_index;
pub mod noop;
pub mod profile_store;
pub mod seed;

pub use artifact_log::ArtifactLog;
pub use content_pool::ContentPool;
pub use keyword_index::{IndexedDocument, KeywordIndex};
pub use noop::NoopRetrieval;
pub use profile_store::ProfileStore;
pub use seed::seed_samples;
