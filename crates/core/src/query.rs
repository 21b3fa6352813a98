//! Artifact log queries: orthogonal, AND-combined filters.
//!
//! Queries are mechanical: no relevance scoring, no interpretation. The
//! caller decides what to ask for, the log only filters.

use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, ArtifactKind};
use crate::error::RequestError;

/// Ordering by (cycle, timestamp), both keys in the same direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A filter/sample specification against the artifact log.
///
/// Unknown field names are rejected on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactQuery {
    /// Exact producing-agent match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    /// Exact category match
    #[serde(rename = "artifact_type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ArtifactKind>,

    /// Closed range `[min, max]`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_range: Option<(u64, u64)>,

    /// Strictly less than
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_cycle: Option<u64>,

    /// Strictly greater than
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_cycle: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_uncertainty: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_profile_update: Option<bool>,

    pub order: SortOrder,

    /// Random sample of this size, applied after ordering and before `limit`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random_sample: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ArtifactQuery {
    /// An unfiltered query, newest first.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    pub fn kind(mut self, kind: ArtifactKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn cycle_range(mut self, min: u64, max: u64) -> Self {
        self.cycle_range = Some((min, max));
        self
    }

    pub fn before(mut self, cycle: u64) -> Self {
        self.before_cycle = Some(cycle);
        self
    }

    pub fn after(mut self, cycle: u64) -> Self {
        self.after_cycle = Some(cycle);
        self
    }

    pub fn uncertainty(mut self, present: bool) -> Self {
        self.has_uncertainty = Some(present);
        self
    }

    pub fn profile_update(mut self, present: bool) -> Self {
        self.has_profile_update = Some(present);
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn sample(mut self, k: usize) -> Self {
        self.random_sample = Some(k);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Reject specifications that can never be meaningful.
    pub fn validate(&self) -> Result<(), RequestError> {
        if let Some((min, max)) = self.cycle_range {
            if min > max {
                return Err(RequestError::InvalidRange { min, max });
            }
        }
        Ok(())
    }

    /// Whether an artifact passes every filter.
    pub fn matches(&self, a: &Artifact) -> bool {
        if let Some(name) = &self.agent_name {
            if &a.agent_name != name {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if a.kind != kind {
                return false;
            }
        }
        if let Some((min, max)) = self.cycle_range {
            if a.cycle < min || a.cycle > max {
                return false;
            }
        }
        if let Some(before) = self.before_cycle {
            if a.cycle >= before {
                return false;
            }
        }
        if let Some(after) = self.after_cycle {
            if a.cycle <= after {
                return false;
            }
        }
        if let Some(wanted) = self.has_uncertainty {
            if a.has_uncertainty() != wanted {
                return false;
            }
        }
        if let Some(wanted) = self.has_profile_update {
            if a.has_profile_update() != wanted {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactBody, MetaReflection};

    fn artifact(agent: &str, cycle: u64, uncertainty: &str) -> Artifact {
        Artifact::new(
            agent,
            cycle,
            ArtifactKind::PartialTheory,
            ArtifactBody {
                description: "d".into(),
                steps: vec![],
                meta: MetaReflection {
                    self_observation: "s".into(),
                    influence_of_other_agent: "i".into(),
                    uncertainties: uncertainty.into(),
                },
            },
        )
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(ArtifactQuery::new().matches(&artifact("Agent A", 1, "")));
    }

    #[test]
    fn cycle_bounds_are_strict_and_range_is_closed() {
        let a = artifact("Agent A", 5, "");
        assert!(ArtifactQuery::new().cycle_range(5, 5).matches(&a));
        assert!(!ArtifactQuery::new().before(5).matches(&a));
        assert!(ArtifactQuery::new().before(6).matches(&a));
        assert!(!ArtifactQuery::new().after(5).matches(&a));
        assert!(ArtifactQuery::new().after(4).matches(&a));
    }

    #[test]
    fn blank_uncertainty_counts_as_absent() {
        let blank = artifact("Agent A", 1, "   ");
        let present = artifact("Agent A", 1, "what is a trace?");
        let q = ArtifactQuery::new().uncertainty(true);
        assert!(!q.matches(&blank));
        assert!(q.matches(&present));
        assert!(ArtifactQuery::new().uncertainty(false).matches(&blank));
    }

    #[test]
    fn filters_are_conjunctive() {
        let a = artifact("Agent A", 3, "x");
        let q = ArtifactQuery::new().agent("Agent A").kind(ArtifactKind::Silence);
        assert!(!q.matches(&a));
        let q = ArtifactQuery::new().agent("Agent A").kind(ArtifactKind::PartialTheory);
        assert!(q.matches(&a));
    }

    #[test]
    fn unknown_filter_names_rejected() {
        let ok: ArtifactQuery =
            serde_json::from_value(serde_json::json!({"agent_name": "Agent A", "limit": 2, "order": "asc"}))
                .unwrap();
        assert_eq!(ok.limit, Some(2));
        assert_eq!(ok.order, SortOrder::Asc);

        let bad = serde_json::from_value::<ArtifactQuery>(serde_json::json!({"relevance": 0.9}));
        assert!(bad.is_err());
    }

    #[test]
    fn inverted_range_fails_validation() {
        assert!(ArtifactQuery::new().cycle_range(9, 2).validate().is_err());
        assert!(ArtifactQuery::new().cycle_range(2, 9).validate().is_ok());
    }
}
