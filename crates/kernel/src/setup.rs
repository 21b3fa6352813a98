//! Wiring the loop from configuration.
//!
//! Opens every store under the data directory, seeds the content pool and
//! pairs each thinker with its own profile file and keyword index. Thinkers
//! are supplied by the caller, so the LLM stack stays outside the kernel.

use copresence_config::AppConfig;
use copresence_core::error::StoreError;
use copresence_core::event::EventBus;
use copresence_core::think::Thinker;
use copresence_store::{ArtifactLog, ContentPool, KeywordIndex, ProfileStore, seed_samples};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::orchestrator::{AgentSlot, CycleOrchestrator, OrchestratorOptions};
use crate::perturbation::ScheduleError;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to open stores: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid perturbation schedule: {0}")]
    Schedule(#[from] ScheduleError),
}

/// Open the artifact log and the seeded content pool.
pub fn open_shared_stores(config: &AppConfig) -> Result<(ArtifactLog, ContentPool), StoreError> {
    let log = ArtifactLog::open(config.artifact_log_path())?;
    let mut pool = ContentPool::open(config.content_pool_path())?;
    let seeded = seed_samples(&mut pool)?;
    if seeded > 0 {
        info!(count = seeded, "Seeded content pool");
    }
    Ok((log, pool))
}

/// Build the orchestrator for `thinkers`, first agent first.
pub fn build_orchestrator(
    config: &AppConfig,
    thinkers: [Arc<dyn Thinker>; 2],
    seed: Option<u64>,
    events: Arc<EventBus>,
) -> Result<CycleOrchestrator, SetupError> {
    let (log, pool) = open_shared_stores(config)?;

    let [first, second] = thinkers;
    let agents = [slot(config, 0, first)?, slot(config, 1, second)?];

    let options = OrchestratorOptions::from_config(config).with_seed(seed);
    Ok(CycleOrchestrator::new(log, pool, agents, options, events)?)
}

fn slot(config: &AppConfig, index: usize, thinker: Arc<dyn Thinker>) -> Result<AgentSlot, StoreError> {
    let profile = ProfileStore::open(config.profile_path(index), thinker.name())?;
    let retrieval = Arc::new(KeywordIndex::open(config.retrieval_index_path(index))?);
    Ok(AgentSlot::new(thinker, profile, retrieval))
}
