//! No-op retrieval store: disables retrieval indexing entirely.

use async_trait::async_trait;
use copresence_core::artifact::Artifact;
use copresence_core::error::StoreError;
use copresence_core::retrieval::RetrievalStore;

/// A retrieval store that indexes nothing.
pub struct NoopRetrieval;

#[async_trait]
impl RetrievalStore for NoopRetrieval {
    fn name(&self) -> &str { "none" }

    async fn index(&self, _artifact: &Artifact) -> Result<(), StoreError> {
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(0)
    }
}
