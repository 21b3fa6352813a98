//! Artifact: one immutable thought trace produced by an agent in a cycle.
//!
//! The serialized shape doubles as the think-step output schema, so a
//! well-formed model reply and a persisted log line share field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::profile::Preferences;

/// Maximum number of characters kept from an error excerpt in a fallback artifact.
pub const FALLBACK_EXCERPT_CHARS: usize = 500;

/// Closed set of artifact categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    HypothesisChain,
    Classification,
    PartialTheory,
    Comparison,
    OpenQuestion,
    Silence,
    /// Produced by the orchestration layer when think-step output cannot be interpreted
    Unparseable,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 7] = [
        Self::HypothesisChain,
        Self::Classification,
        Self::PartialTheory,
        Self::Comparison,
        Self::OpenQuestion,
        Self::Silence,
        Self::Unparseable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HypothesisChain => "hypothesis_chain",
            Self::Classification => "classification",
            Self::PartialTheory => "partial_theory",
            Self::Comparison => "comparison",
            Self::OpenQuestion => "open_question",
            Self::Silence => "silence",
            Self::Unparseable => "unparseable",
        }
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("unknown artifact type '{s}'"))
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single labeled step in the reasoning chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// assumption, inference, counterexample, observation, open_end, conclusion, ...
    pub label: String,
    pub content: String,
}

impl Step {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

/// The mandatory meta-reflection block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaReflection {
    pub self_observation: String,
    pub influence_of_other_agent: String,
    pub uncertainties: String,
}

/// The content payload of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBody {
    pub description: String,

    #[serde(default)]
    pub steps: Vec<Step>,

    #[serde(rename = "meta_cognition")]
    pub meta: MetaReflection,
}

/// A proposed change to the producing agent's profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileChangeRequest {
    #[serde(default)]
    pub proposed_changes: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    pub comment: String,
}

/// A structured thought trace. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,

    pub agent_name: String,

    #[serde(rename = "cycle_id")]
    pub cycle: u64,

    pub timestamp: DateTime<Utc>,

    #[serde(rename = "artifact_type")]
    pub kind: ArtifactKind,

    #[serde(rename = "artifact")]
    pub body: ArtifactBody,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_update: Option<ProfileChangeRequest>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_snapshot: Option<Preferences>,

    #[serde(default)]
    pub silence_flag: bool,
}

impl Artifact {
    /// Create an artifact stamped with the current time.
    pub fn new(
        agent_name: impl Into<String>,
        cycle: u64,
        kind: ArtifactKind,
        body: ArtifactBody,
    ) -> Self {
        Self::at(agent_name, cycle, Utc::now(), kind, body)
    }

    /// Create an artifact with an explicit timestamp.
    pub fn at(
        agent_name: impl Into<String>,
        cycle: u64,
        timestamp: DateTime<Utc>,
        kind: ArtifactKind,
        body: ArtifactBody,
    ) -> Self {
        let agent_name = agent_name.into();
        Self {
            id: artifact_id(&agent_name, cycle, &timestamp),
            agent_name,
            cycle,
            timestamp,
            kind,
            body,
            profile_update: None,
            profile_snapshot: None,
            silence_flag: false,
        }
    }

    /// The well-formed stand-in for output that could not be interpreted.
    pub fn fallback(
        agent_name: impl Into<String>,
        cycle: u64,
        error_info: &str,
        snapshot: Preferences,
    ) -> Self {
        let excerpt: String = error_info.chars().take(FALLBACK_EXCERPT_CHARS).collect();
        Self::new(
            agent_name,
            cycle,
            ArtifactKind::Unparseable,
            ArtifactBody {
                description: "Error parsing agent output".into(),
                steps: vec![Step::new("error", excerpt)],
                meta: MetaReflection {
                    self_observation: "Output parsing failed".into(),
                    influence_of_other_agent: "N/A".into(),
                    uncertainties: "Cannot determine due to error".into(),
                },
            },
        )
        .with_snapshot(snapshot)
    }

    pub fn with_profile_update(mut self, update: ProfileChangeRequest) -> Self {
        self.profile_update = Some(update);
        self
    }

    pub fn with_snapshot(mut self, snapshot: Preferences) -> Self {
        self.profile_snapshot = Some(snapshot);
        self
    }

    pub fn with_silence(mut self, silent: bool) -> Self {
        self.silence_flag = silent;
        self
    }

    /// Whether the meta-reflection carries non-blank uncertainty text.
    pub fn has_uncertainty(&self) -> bool {
        !self.body.meta.uncertainties.trim().is_empty()
    }

    /// Whether the artifact proposes a non-empty profile change set.
    pub fn has_profile_update(&self) -> bool {
        self.profile_update
            .as_ref()
            .is_some_and(|u| !u.proposed_changes.is_empty())
    }
}

/// Deterministic identity from agent, cycle and sub-second timestamp.
pub fn artifact_id(agent_name: &str, cycle: u64, timestamp: &DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}",
        agent_name.replace(' ', "_").to_lowercase(),
        cycle,
        timestamp.format("%Y%m%d%H%M%S%6f")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn body(desc: &str) -> ArtifactBody {
        ArtifactBody {
            description: desc.into(),
            steps: vec![Step::new("observation", "the log is empty")],
            meta: MetaReflection {
                self_observation: "terse".into(),
                influence_of_other_agent: "none yet".into(),
                uncertainties: "".into(),
            },
        }
    }

    #[test]
    fn id_is_deterministic() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap()
            + chrono::Duration::microseconds(123_456);
        let a = Artifact::at("Agent A", 12, ts, ArtifactKind::Comparison, body("x"));
        assert_eq!(a.id, "agent_a_12_20260304050607123456");
        let b = Artifact::at("Agent A", 12, ts, ArtifactKind::Silence, body("y"));
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn kind_parses_and_displays() {
        for kind in ArtifactKind::ALL {
            assert_eq!(kind.as_str().parse::<ArtifactKind>().unwrap(), kind);
        }
        assert!("poem".parse::<ArtifactKind>().is_err());
        assert_eq!(ArtifactKind::OpenQuestion.to_string(), "open_question");
    }

    #[test]
    fn fallback_is_well_formed() {
        let long = "x".repeat(2000);
        let a = Artifact::fallback("Agent B", 4, &long, Preferences::default());
        assert_eq!(a.kind, ArtifactKind::Unparseable);
        assert_eq!(a.body.steps.len(), 1);
        assert_eq!(a.body.steps[0].label, "error");
        assert_eq!(a.body.steps[0].content.chars().count(), FALLBACK_EXCERPT_CHARS);
        assert!(!a.body.meta.self_observation.is_empty());
        assert!(!a.body.meta.influence_of_other_agent.is_empty());
        assert!(a.has_uncertainty());
        assert!(a.profile_snapshot.is_some());
    }

    #[test]
    fn uncertainty_and_profile_flags() {
        let a = Artifact::new("Agent A", 1, ArtifactKind::PartialTheory, body("d"));
        assert!(!a.has_uncertainty());
        assert!(!a.has_profile_update());

        let empty = a.clone().with_profile_update(ProfileChangeRequest::default());
        assert!(!empty.has_profile_update());

        let mut changes = serde_json::Map::new();
        changes.insert("self_focus".into(), serde_json::json!(0.2));
        let full = a.with_profile_update(ProfileChangeRequest {
            proposed_changes: changes,
            comment: "less self".into(),
        });
        assert!(full.has_profile_update());
    }

    #[test]
    fn serializes_with_wire_names() {
        let a = Artifact::new("Agent A", 2, ArtifactKind::HypothesisChain, body("d"));
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["cycle_id"], 2);
        assert_eq!(json["artifact_type"], "hypothesis_chain");
        assert!(json["artifact"]["meta_cognition"].is_object());
        assert!(json.get("profile_update").is_none());

        let back: Artifact = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }
}
