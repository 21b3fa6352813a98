//! Keyword retrieval index: persistent JSON-lines document store.
//!
//! Each agent gets its own index of the artifacts it produced, flattened to
//! plain text plus a small metadata map. The cycle loop only writes; the
//! keyword search exists for humans poking at a run afterwards.
//!
//! Storage location: `<data>/rag_{a,b}/index.jsonl`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use copresence_core::artifact::Artifact;
use copresence_core::error::StoreError;
use copresence_core::retrieval::RetrievalStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::jsonl;

/// One indexed artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub id: String,
    pub text: String,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    pub indexed_at: DateTime<Utc>,

    /// Relevance score, set by `search`
    #[serde(default, skip_serializing)]
    pub score: f32,
}

impl IndexedDocument {
    /// Flatten an artifact into searchable text and metadata.
    pub fn from_artifact(artifact: &Artifact) -> Self {
        let body = &artifact.body;
        let mut parts = vec![format!("Description: {}", body.description)];
        for step in &body.steps {
            parts.push(format!("{}: {}", step.label, step.content));
        }
        parts.push(format!("Self-observation: {}", body.meta.self_observation));
        parts.push(format!("Influence of other: {}", body.meta.influence_of_other_agent));
        parts.push(format!("Uncertainties: {}", body.meta.uncertainties));

        let mut metadata = serde_json::Map::new();
        metadata.insert("agent_name".into(), artifact.agent_name.clone().into());
        metadata.insert("cycle_id".into(), artifact.cycle.into());
        metadata.insert("artifact_type".into(), artifact.kind.as_str().into());
        metadata.insert("silence_flag".into(), artifact.silence_flag.into());
        metadata.insert("has_profile_update".into(), artifact.has_profile_update().into());
        metadata.insert("has_uncertainty".into(), artifact.has_uncertainty().into());
        metadata.insert("step_count".into(), body.steps.len().into());

        Self {
            id: artifact.id.clone(),
            text: parts.join("\n"),
            metadata,
            indexed_at: Utc::now(),
            score: 0.0,
        }
    }
}

/// A file-backed keyword index using JSONL (one document per line).
///
/// Documents are loaded into memory on creation; each new document is
/// appended to disk before it becomes visible.
pub struct KeywordIndex {
    path: PathBuf,
    docs: Arc<RwLock<Vec<IndexedDocument>>>,
}

impl KeywordIndex {
    /// Open the index at the given path, loading any existing documents.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        jsonl::ensure_parent(&path)?;
        let docs: Vec<IndexedDocument> = jsonl::replay(&path)?;
        debug!(path = %path.display(), count = docs.len(), "Keyword index loaded");
        Ok(Self {
            path,
            docs: Arc::new(RwLock::new(docs)),
        })
    }

    /// Case-insensitive keyword search, highest occurrence density first.
    pub async fn search(&self, text: &str, limit: usize) -> Vec<IndexedDocument> {
        let docs = self.docs.read().await;
        let needle = text.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<IndexedDocument> = docs
            .iter()
            .filter_map(|d| {
                let occurrences = d.text.to_lowercase().matches(&needle).count();
                if occurrences == 0 {
                    return None;
                }
                let mut hit = d.clone();
                hit.score = occurrences as f32 / (d.text.len() as f32 / 100.0).max(1.0);
                Some(hit)
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(limit);
        results
    }

    pub async fn get(&self, id: &str) -> Option<IndexedDocument> {
        self.docs.read().await.iter().find(|d| d.id == id).cloned()
    }
}

#[async_trait]
impl RetrievalStore for KeywordIndex {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn index(&self, artifact: &Artifact) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        if docs.iter().any(|d| d.id == artifact.id) {
            return Ok(());
        }
        let doc = IndexedDocument::from_artifact(artifact);
        jsonl::append(&self.path, &doc)?;
        docs.push(doc);
        Ok(())
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.docs.read().await.len())
    }
}
