//! Request resolver: turns declarative read-requests into context.
//!
//! Purely mechanical: every request is run in order against its target
//! store, results are concatenated per target, then deduplicated by id
//! keeping the first occurrence.

use copresence_core::artifact::Artifact;
use copresence_core::content::ContentEntry;
use copresence_core::request::{PoolQuery, ReadRequest};
use copresence_store::{ArtifactLog, ContentPool};
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Resolved context for one think-step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedContext {
    pub artifacts: Vec<Artifact>,
    pub content: Vec<ContentEntry>,
}

pub struct RequestResolver<'a> {
    log: &'a ArtifactLog,
    pool: &'a ContentPool,
}

impl<'a> RequestResolver<'a> {
    pub fn new(log: &'a ArtifactLog, pool: &'a ContentPool) -> Self {
        Self { log, pool }
    }

    pub fn resolve<R: Rng + ?Sized>(&self, requests: &[ReadRequest], rng: &mut R) -> ResolvedContext {
        let mut artifacts: Vec<&Artifact> = Vec::new();
        let mut content: Vec<&ContentEntry> = Vec::new();

        for request in requests {
            match request {
                ReadRequest::Log { label, filter } => {
                    let hits = self.log.query_with(filter, rng);
                    debug!(label = %label, hits = hits.len(), "Resolved log request");
                    artifacts.extend(hits);
                }
                ReadRequest::Pool { label, filter } => {
                    let hits = self.resolve_pool(filter, rng);
                    debug!(label = %label, hits = hits.len(), "Resolved pool request");
                    content.extend(hits);
                }
            }
        }

        ResolvedContext {
            artifacts: dedup_by_id(artifacts, |a| &a.id),
            content: dedup_by_id(content, |c| &c.id),
        }
    }

    fn resolve_pool<R: Rng + ?Sized>(&self, query: &PoolQuery, rng: &mut R) -> Vec<&'a ContentEntry> {
        match query {
            PoolQuery::Sample { category, n } => self.pool.sample_with(*category, *n, rng),
            PoolQuery::Search { text, category, limit } => self.pool.search(text, *category, *limit),
            PoolQuery::RareCategory => self.pool.rarest_category_sample_with(rng).into_iter().collect(),
        }
    }
}

/// Keep the first occurrence of every id, preserving order.
fn dedup_by_id<T: Clone>(items: Vec<&T>, id: impl Fn(&T) -> &String) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(id(*item).clone()))
        .cloned()
        .collect()
}
