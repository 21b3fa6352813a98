//! Retrieval store: a per-agent index of artifacts for offline analysis.
//!
//! The cycle loop only ever writes to it, best-effort. Nothing in the
//! orchestration consults it.

use async_trait::async_trait;

use crate::artifact::Artifact;
use crate::error::StoreError;

#[async_trait]
pub trait RetrievalStore: Send + Sync {
    /// The backend name (e.g., "keyword", "none").
    fn name(&self) -> &str;

    /// Index an artifact. Re-indexing a known id is a no-op.
    async fn index(&self, artifact: &Artifact) -> Result<(), StoreError>;

    /// Number of indexed documents.
    async fn count(&self) -> Result<usize, StoreError>;
}
