//! Artifact log: append-only JSONL file mirrored by an in-memory index.
//!
//! Storage location: `<data>/environment/artifacts.jsonl`
//!
//! Opening the log replays the file top to bottom. Every append writes and
//! syncs the line before the record is admitted to the index, so the two are
//! consistent after each call. Records are never mutated or removed.

use copresence_core::artifact::Artifact;
use copresence_core::error::StoreError;
use copresence_core::query::{ArtifactQuery, SortOrder};
use rand::Rng;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::jsonl;

pub struct ArtifactLog {
    path: PathBuf,
    records: Vec<Artifact>,
    ids: HashSet<String>,
}

impl ArtifactLog {
    /// Open (or create on first append) the log at `path`, replaying it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        jsonl::ensure_parent(&path)?;
        let records: Vec<Artifact> = jsonl::replay(&path)?;

        let mut ids = HashSet::with_capacity(records.len());
        for record in &records {
            if !ids.insert(record.id.clone()) {
                warn!(id = %record.id, "Duplicate artifact id in log");
            }
        }

        info!(path = %path.display(), count = records.len(), "Artifact log loaded");
        Ok(Self { path, records, ids })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record: durable write first, index second. An id the log
    /// already holds is refused before anything is written.
    pub fn append(&mut self, artifact: Artifact) -> Result<(), StoreError> {
        if self.ids.contains(&artifact.id) {
            return Err(StoreError::DuplicateId(artifact.id));
        }
        jsonl::append(&self.path, &artifact)?;
        debug!(
            id = %artifact.id,
            agent = %artifact.agent_name,
            cycle = artifact.cycle,
            "Artifact appended"
        );
        self.ids.insert(artifact.id.clone());
        self.records.push(artifact);
        Ok(())
    }

    /// Run a query using the thread-local RNG for sampling.
    pub fn query(&self, query: &ArtifactQuery) -> Vec<&Artifact> {
        self.query_with(query, &mut rand::rng())
    }

    /// Run a query: filter, order, sample, then limit.
    ///
    /// Ordering is (cycle, timestamp) in the requested direction; the sort is
    /// stable so exact ties keep insertion order. A sample of `k` is a no-op
    /// when `k >= len`; sampled records keep their relative order.
    pub fn query_with<R: Rng + ?Sized>(&self, query: &ArtifactQuery, rng: &mut R) -> Vec<&Artifact> {
        let mut results: Vec<&Artifact> = self.records.iter().filter(|a| query.matches(a)).collect();

        match query.order {
            SortOrder::Asc => results.sort_by(|a, b| (a.cycle, a.timestamp).cmp(&(b.cycle, b.timestamp))),
            SortOrder::Desc => results.sort_by(|a, b| (b.cycle, b.timestamp).cmp(&(a.cycle, a.timestamp))),
        }

        if let Some(k) = query.random_sample {
            if k < results.len() {
                let mut picked = rand::seq::index::sample(rng, results.len(), k).into_vec();
                picked.sort_unstable();
                results = picked.into_iter().map(|i| results[i]).collect();
            }
        }

        if let Some(limit) = query.limit {
            results.truncate(limit);
        }

        results
    }

    /// Highest cycle number seen, or 0 when empty.
    pub fn latest_cycle(&self) -> u64 {
        self.records.iter().map(|a| a.cycle).max().unwrap_or(0)
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records of one cycle, in append order.
    pub fn by_cycle(&self, cycle: u64) -> Vec<&Artifact> {
        self.records.iter().filter(|a| a.cycle == cycle).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Artifact> {
        if !self.ids.contains(id) {
            return None;
        }
        self.records.iter().find(|a| a.id == id)
    }

    /// Every record in append order.
    pub fn all(&self) -> &[Artifact] {
        &self.records
    }
}
