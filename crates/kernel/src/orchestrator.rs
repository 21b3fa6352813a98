//! The cycle loop.
//!
//! Per cycle: advance the counter, poll the perturbation scheduler once,
//! then run each agent in fixed order (resolve reads, think, interpret,
//! append, index, apply profile update). Both agents see the same
//! perturbation. Storage and provider failures abort the cycle and carry
//! its number; nothing is rolled back.

use chrono::Utc;
use copresence_core::artifact::Artifact;
use copresence_core::error::Error;
use copresence_core::event::{DomainEvent, EventBus};
use copresence_core::perturbation::Perturbation;
use copresence_core::profile::Preferences;
use copresence_core::retrieval::RetrievalStore;
use copresence_core::think::{ReadContext, ThinkInput, ThinkOutput, Thinker};
use copresence_store::{ArtifactLog, ContentPool, ProfileStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::interpret::{Interpretation, interpret};
use crate::perturbation::{PerturbationScheduler, ScheduleError};
use crate::resolver::RequestResolver;

/// Everything the loop holds for one agent.
pub struct AgentSlot {
    pub thinker: Arc<dyn Thinker>,
    pub profile: ProfileStore,
    pub retrieval: Arc<dyn RetrievalStore>,
}

impl AgentSlot {
    pub fn new(thinker: Arc<dyn Thinker>, profile: ProfileStore, retrieval: Arc<dyn RetrievalStore>) -> Self {
        Self {
            thinker,
            profile,
            retrieval,
        }
    }

    pub fn name(&self) -> &str {
        self.thinker.name()
    }
}

/// Scheduler bounds and an optional seed for every random draw in the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub min_gap: u64,
    pub max_gap: u64,
    pub seed: Option<u64>,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            min_gap: 10,
            max_gap: 30,
            seed: None,
        }
    }
}

impl OrchestratorOptions {
    pub fn from_config(config: &copresence_config::AppConfig) -> Self {
        Self {
            min_gap: config.perturbation.min_gap,
            max_gap: config.perturbation.max_gap,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// A fatal failure, tagged with the cycle that triggered it.
#[derive(Debug, thiserror::Error)]
#[error("Cycle {cycle} failed: {source}")]
pub struct CycleError {
    pub cycle: u64,
    #[source]
    pub source: Error,
}

impl CycleError {
    fn new(cycle: u64, source: impl Into<Error>) -> Self {
        Self {
            cycle,
            source: source.into(),
        }
    }
}

/// One completed cycle.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub cycle: u64,
    pub perturbation: Option<Perturbation>,
    /// First agent, then second
    pub artifacts: [Artifact; 2],
}

pub struct CycleOrchestrator {
    log: ArtifactLog,
    pool: ContentPool,
    agents: [AgentSlot; 2],
    scheduler: PerturbationScheduler,
    events: Arc<EventBus>,
    rng: StdRng,
    current_cycle: u64,
}

impl CycleOrchestrator {
    /// Build the loop over already-opened stores. Numbering resumes from
    /// the log's latest cycle.
    pub fn new(
        log: ArtifactLog,
        pool: ContentPool,
        agents: [AgentSlot; 2],
        options: OrchestratorOptions,
        events: Arc<EventBus>,
    ) -> Result<Self, ScheduleError> {
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let current_cycle = log.latest_cycle();
        let scheduler = PerturbationScheduler::new(options.min_gap, options.max_gap, current_cycle, &mut rng)?;

        info!(
            current_cycle,
            artifacts = log.count(),
            pool = pool.count(),
            first = %agents[0].name(),
            second = %agents[1].name(),
            next_perturbation = scheduler.next_due(),
            "Cycle orchestrator ready"
        );

        Ok(Self {
            log,
            pool,
            agents,
            scheduler,
            events,
            rng,
            current_cycle,
        })
    }

    pub fn current_cycle(&self) -> u64 {
        self.current_cycle
    }

    pub fn next_perturbation_due(&self) -> u64 {
        self.scheduler.next_due()
    }

    pub fn log(&self) -> &ArtifactLog {
        &self.log
    }

    pub fn pool(&self) -> &ContentPool {
        &self.pool
    }

    pub fn agents(&self) -> &[AgentSlot; 2] {
        &self.agents
    }

    pub fn profiles(&self) -> impl Iterator<Item = &ProfileStore> {
        self.agents.iter().map(|slot| &slot.profile)
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    /// Run one full cycle: both agents, in order.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        self.current_cycle += 1;
        let cycle = self.current_cycle;
        self.events.publish(DomainEvent::CycleStarted {
            cycle,
            timestamp: Utc::now(),
        });
        info!(cycle, "Cycle started");

        let perturbation = self.scheduler.poll(cycle, &self.log, &self.pool, &mut self.rng);
        if let Some(p) = &perturbation {
            self.events.publish(DomainEvent::PerturbationInjected {
                cycle,
                kind: p.kind,
                timestamp: Utc::now(),
            });
        }

        let first = self.run_agent(0, cycle, perturbation.as_ref()).await?;
        let second = self.run_agent(1, cycle, perturbation.as_ref()).await?;

        Ok(CycleOutcome {
            cycle,
            perturbation,
            artifacts: [first, second],
        })
    }

    /// Run `n` cycles, stopping at the first fatal error.
    pub async fn run_cycles(&mut self, n: u64) -> Result<Vec<CycleOutcome>, CycleError> {
        let mut outcomes = Vec::new();
        for _ in 0..n {
            outcomes.push(self.run_cycle().await?);
        }
        Ok(outcomes)
    }

    async fn run_agent(
        &mut self,
        index: usize,
        cycle: u64,
        perturbation: Option<&Perturbation>,
    ) -> Result<Artifact, CycleError> {
        let thinker = Arc::clone(&self.agents[index].thinker);
        let retrieval = Arc::clone(&self.agents[index].retrieval);
        let agent = thinker.name().to_string();
        let preferences = self.agents[index].profile.snapshot();

        let requests = thinker.read_requests(ReadContext {
            cycle,
            preferences: &preferences,
            log_count: self.log.count(),
            pool_available: !self.pool.is_empty(),
        });
        let resolved = RequestResolver::new(&self.log, &self.pool).resolve(&requests, &mut self.rng);
        debug!(
            cycle,
            agent = %agent,
            requests = requests.len(),
            traces = resolved.artifacts.len(),
            content = resolved.content.len(),
            "Context resolved"
        );

        let input = ThinkInput {
            cycle,
            artifacts: resolved.artifacts,
            content: resolved.content,
            perturbation: perturbation.cloned(),
            preferences,
            self_name: agent.clone(),
            other_name: thinker.counterpart().to_string(),
        };
        let output = thinker.think(&input).await.map_err(|e| CycleError::new(cycle, e))?;

        let interpretation = match output {
            ThinkOutput::Raw(text) => interpret(&text, &agent, cycle, preferences),
            ThinkOutput::Artifact(artifact) => self.admit_structured(*artifact, &agent, cycle, preferences),
        };
        let artifact = match interpretation {
            Interpretation::Parsed(artifact) => artifact,
            Interpretation::Fallback(artifact) => {
                self.events.publish(DomainEvent::OutputUnparseable {
                    cycle,
                    agent: agent.clone(),
                    timestamp: Utc::now(),
                });
                artifact
            }
        };

        self.log
            .append(artifact.clone())
            .map_err(|e| CycleError::new(cycle, e))?;
        self.events.publish(DomainEvent::ArtifactAppended {
            cycle,
            agent: agent.clone(),
            artifact_id: artifact.id.clone(),
            kind: artifact.kind,
            timestamp: Utc::now(),
        });
        info!(cycle, agent = %agent, artifact_id = %artifact.id, kind = %artifact.kind, "Artifact appended");

        if let Err(e) = retrieval.index(&artifact).await {
            warn!(cycle, agent = %agent, store = retrieval.name(), error = %e, "Retrieval indexing failed");
            self.events.publish(DomainEvent::RetrievalIndexFailed {
                cycle,
                agent: agent.clone(),
                error_message: e.to_string(),
                timestamp: Utc::now(),
            });
        }

        if let Some(update) = artifact.profile_update.as_ref().filter(|u| !u.proposed_changes.is_empty()) {
            let applied = self.agents[index]
                .profile
                .apply(&update.proposed_changes, cycle, &update.comment)
                .map_err(|e| CycleError::new(cycle, e))?;
            info!(cycle, agent = %agent, applied = ?applied, "Profile updated");
            self.events.publish(DomainEvent::ProfileUpdated {
                cycle,
                agent,
                applied,
                timestamp: Utc::now(),
            });
        }

        Ok(artifact)
    }

    /// Check a ready-made artifact against the slot and cycle it was produced
    /// for. An artifact claiming another agent or cycle, or reusing an id the
    /// log already holds, is replaced by a fallback.
    fn admit_structured(
        &self,
        mut artifact: Artifact,
        agent: &str,
        cycle: u64,
        preferences: Preferences,
    ) -> Interpretation {
        let problem = if artifact.agent_name != agent {
            Some(format!("artifact claims agent '{}'", artifact.agent_name))
        } else if artifact.cycle != cycle {
            Some(format!("artifact claims cycle {}", artifact.cycle))
        } else if self.log.get(&artifact.id).is_some() {
            Some(format!("artifact id {} is already in the log", artifact.id))
        } else {
            None
        };

        if let Some(problem) = problem {
            warn!(cycle, agent = %agent, %problem, "Structured output rejected");
            return Interpretation::Fallback(Artifact::fallback(agent, cycle, &problem, preferences));
        }

        if artifact.profile_snapshot.is_none() {
            artifact.profile_snapshot = Some(preferences);
        }
        Interpretation::Parsed(artifact)
    }
}
