//! Perturbation scheduler: irregular "shocks" drawn from history or the pool.
//!
//! One state variable, `next_due`. Every firing picks a kind uniformly and
//! reschedules, whether or not the chosen kind found source material.

use copresence_core::content::ContentEntry;
use copresence_core::perturbation::{Perturbation, PerturbationContent, PerturbationKind};
use copresence_core::query::ArtifactQuery;
use copresence_store::{ArtifactLog, ContentPool};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

/// Old traces come from strictly before `cycle - OLD_TRACE_DEPTH`.
pub const OLD_TRACE_DEPTH: u64 = 20;

/// Summaries draw from strictly before `cycle - SUMMARY_DEPTH`.
pub const SUMMARY_DEPTH: u64 = 10;

/// Number of traces folded into a compressed summary.
pub const SUMMARY_TRACES: usize = 3;

/// Characters kept from each summarised description.
pub const SUMMARY_FRAGMENT_CHARS: usize = 50;

/// Characters kept from an anomalous pool entry.
pub const EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Perturbation gap must be at least 1 cycle")]
    ZeroGap,

    #[error("Perturbation min gap {min} exceeds max gap {max}")]
    InvertedGap { min: u64, max: u64 },
}

#[derive(Debug, Clone)]
pub struct PerturbationScheduler {
    min_gap: u64,
    max_gap: u64,
    next_due: u64,
}

impl PerturbationScheduler {
    /// Create a scheduler whose first firing is due `gap` cycles after
    /// `current_cycle`.
    pub fn new<R: Rng + ?Sized>(
        min_gap: u64,
        max_gap: u64,
        current_cycle: u64,
        rng: &mut R,
    ) -> Result<Self, ScheduleError> {
        if min_gap == 0 {
            return Err(ScheduleError::ZeroGap);
        }
        if min_gap > max_gap {
            return Err(ScheduleError::InvertedGap {
                min: min_gap,
                max: max_gap,
            });
        }
        let mut scheduler = Self {
            min_gap,
            max_gap,
            next_due: 0,
        };
        scheduler.reschedule(current_cycle, rng);
        Ok(scheduler)
    }

    pub fn next_due(&self) -> u64 {
        self.next_due
    }

    pub fn gaps(&self) -> (u64, u64) {
        (self.min_gap, self.max_gap)
    }

    fn reschedule<R: Rng + ?Sized>(&mut self, cycle: u64, rng: &mut R) {
        self.next_due = cycle + rng.random_range(self.min_gap..=self.max_gap);
        debug!(cycle, next_due = self.next_due, "Perturbation scheduled");
    }

    /// Advance to `cycle`. Fires when due; the result is `None` both when
    /// nothing was due and when the chosen kind had no source material.
    pub fn poll<R: Rng + ?Sized>(
        &mut self,
        cycle: u64,
        log: &ArtifactLog,
        pool: &ContentPool,
        rng: &mut R,
    ) -> Option<Perturbation> {
        if cycle < self.next_due {
            return None;
        }

        let kind = PerturbationKind::ALL[rng.random_range(0..PerturbationKind::ALL.len())];
        let perturbation = build(kind, cycle, log, pool, rng);
        self.reschedule(cycle, rng);

        match &perturbation {
            Some(_) => info!(cycle, kind = kind.as_str(), "Perturbation fired"),
            None => info!(cycle, kind = kind.as_str(), "Perturbation fired without source material"),
        }
        perturbation
    }
}

/// Build one perturbation of the given kind for `cycle`.
pub fn build<R: Rng + ?Sized>(
    kind: PerturbationKind,
    cycle: u64,
    log: &ArtifactLog,
    pool: &ContentPool,
    rng: &mut R,
) -> Option<Perturbation> {
    match kind {
        PerturbationKind::OldTrace => old_trace(cycle, log, rng),
        PerturbationKind::AnomalousWorld => pool.rarest_category_sample_with(rng).map(anomalous_world),
        PerturbationKind::CompressedSummary => compressed_summary(cycle, log, rng),
    }
}

fn horizon(cycle: u64, depth: u64) -> u64 {
    cycle.saturating_sub(depth).max(1)
}

fn old_trace<R: Rng + ?Sized>(cycle: u64, log: &ArtifactLog, rng: &mut R) -> Option<Perturbation> {
    let query = ArtifactQuery::new().before(horizon(cycle, OLD_TRACE_DEPTH)).sample(1);
    let trace = log.query_with(&query, rng).into_iter().next()?;
    Some(Perturbation {
        kind: PerturbationKind::OldTrace,
        description: "A trace from the distant past".into(),
        content: PerturbationContent::Trace {
            agent: trace.agent_name.clone(),
            cycle: trace.cycle,
            description: trace.body.description.clone(),
            kind: trace.kind.as_str().into(),
        },
    })
}

fn anomalous_world(entry: &ContentEntry) -> Perturbation {
    Perturbation {
        kind: PerturbationKind::AnomalousWorld,
        description: "Unexpected content from the World".into(),
        content: PerturbationContent::Excerpt {
            category: entry.category.as_str().into(),
            title: entry.title.clone(),
            excerpt: entry.body.chars().take(EXCERPT_CHARS).collect(),
        },
    }
}

fn compressed_summary<R: Rng + ?Sized>(cycle: u64, log: &ArtifactLog, rng: &mut R) -> Option<Perturbation> {
    let query = ArtifactQuery::new()
        .before(horizon(cycle, SUMMARY_DEPTH))
        .sample(SUMMARY_TRACES);
    let traces = log.query_with(&query, rng);
    if traces.is_empty() {
        return None;
    }

    let summary = traces
        .iter()
        .map(|t| {
            let fragment: String = t.body.description.chars().take(SUMMARY_FRAGMENT_CHARS).collect();
            format!("[{}@{}]: {}...", t.agent_name, t.cycle, fragment)
        })
        .collect::<Vec<_>>()
        .join(" | ");

    Some(Perturbation {
        kind: PerturbationKind::CompressedSummary,
        description: "Imperfect compression of past traces".into(),
        content: PerturbationContent::Summary(summary),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use copresence_core::artifact::{Artifact, ArtifactBody, ArtifactKind, MetaReflection};
    use copresence_core::content::ContentCategory;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn artifact(agent: &str, cycle: u64, description: &str) -> Artifact {
        let ts = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap() + Duration::seconds(cycle as i64);
        Artifact::at(
            agent,
            cycle,
            ts,
            ArtifactKind::PartialTheory,
            ArtifactBody {
                description: description.into(),
                steps: vec![],
                meta: MetaReflection {
                    self_observation: "s".into(),
                    influence_of_other_agent: "i".into(),
                    uncertainties: String::new(),
                },
            },
        )
    }

    fn stores(cycles: u64) -> (tempfile::TempDir, ArtifactLog, ContentPool) {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ArtifactLog::open(dir.path().join("artifacts.jsonl")).unwrap();
        for c in 1..=cycles {
            log.append(artifact("Agent A", c, &format!("{} thought {c}", "long ".repeat(20))))
                .unwrap();
        }
        let pool = ContentPool::open(dir.path().join("content.jsonl")).unwrap();
        (dir, log, pool)
    }

    #[test]
    fn rejects_bad_gaps() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            PerturbationScheduler::new(0, 5, 0, &mut rng).unwrap_err(),
            ScheduleError::ZeroGap
        );
        assert_eq!(
            PerturbationScheduler::new(9, 3, 0, &mut rng).unwrap_err(),
            ScheduleError::InvertedGap { min: 9, max: 3 }
        );
    }

    #[test]
    fn fixed_gap_fires_exactly_on_schedule() {
        let (_dir, log, mut pool) = stores(0);
        pool.add(ContentEntry::new("d1", ContentCategory::Data, "Table", "a,b"))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut scheduler = PerturbationScheduler::new(10, 10, 0, &mut rng).unwrap();
        assert_eq!(scheduler.next_due(), 10);

        for cycle in 1..10 {
            assert!(scheduler.poll(cycle, &log, &pool, &mut rng).is_none());
            assert_eq!(scheduler.next_due(), 10);
        }
        scheduler.poll(10, &log, &pool, &mut rng);
        assert_eq!(scheduler.next_due(), 20);
    }

    #[test]
    fn gap_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        for start in [0, 7, 100] {
            let s = PerturbationScheduler::new(10, 30, start, &mut rng).unwrap();
            assert!((start + 10..=start + 30).contains(&s.next_due()));
        }
    }

    #[test]
    fn empty_sources_yield_nothing_but_still_reschedule() {
        let (_dir, log, pool) = stores(0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut scheduler = PerturbationScheduler::new(1, 1, 0, &mut rng).unwrap();
        assert!(scheduler.poll(1, &log, &pool, &mut rng).is_none());
        assert_eq!(scheduler.next_due(), 2);
    }

    #[test]
    fn old_trace_comes_from_before_the_horizon() {
        let (_dir, log, pool) = stores(30);
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..20 {
            let p = build(PerturbationKind::OldTrace, 30, &log, &pool, &mut rng).unwrap();
            match p.content {
                PerturbationContent::Trace { cycle, kind, .. } => {
                    assert!(cycle < 10);
                    assert_eq!(kind, "partial_theory");
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        // Horizon clamps to 1, and nothing precedes cycle 1.
        assert!(build(PerturbationKind::OldTrace, 15, &log, &pool, &mut rng).is_none());
    }

    #[test]
    fn summary_is_lossy_and_joined() {
        let (_dir, log, pool) = stores(20);
        let mut rng = StdRng::seed_from_u64(2);
        let p = build(PerturbationKind::CompressedSummary, 20, &log, &pool, &mut rng).unwrap();
        assert_eq!(p.description, "Imperfect compression of past traces");
        let PerturbationContent::Summary(text) = p.content else {
            panic!("expected a summary");
        };
        let fragments: Vec<_> = text.split(" | ").collect();
        assert_eq!(fragments.len(), 3);
        for fragment in fragments {
            assert!(fragment.starts_with("[Agent A@"));
            assert!(fragment.ends_with("..."));
            let body = fragment.split_once("]: ").unwrap().1;
            assert_eq!(body.chars().count(), SUMMARY_FRAGMENT_CHARS + 3);
        }
    }

    #[test]
    fn anomalous_world_takes_the_rarest_category() {
        let (_dir, log, mut pool) = stores(0);
        pool.add(ContentEntry::new("t1", ContentCategory::Text, "A", "x")).unwrap();
        pool.add(ContentEntry::new("t2", ContentCategory::Text, "B", "y")).unwrap();
        pool.add(ContentEntry::new("c1", ContentCategory::Code, "Loop", "z".repeat(400)))
            .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        let p = build(PerturbationKind::AnomalousWorld, 5, &log, &pool, &mut rng).unwrap();
        match p.content {
            PerturbationContent::Excerpt { category, title, excerpt } => {
                assert_eq!(category, "code");
                assert_eq!(title, "Loop");
                assert_eq!(excerpt.chars().count(), EXCERPT_CHARS);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
