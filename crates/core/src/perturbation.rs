//! Perturbations: unexpected inputs injected into a cycle.
//!
//! A payload is built once per firing and handed to both agents unchanged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerturbationKind {
    /// A trace from the distant past of the log
    OldTrace,
    /// An entry from the rarest pool category
    AnomalousWorld,
    /// A lossy summary of several older traces
    CompressedSummary,
}

impl PerturbationKind {
    pub const ALL: [PerturbationKind; 3] =
        [Self::OldTrace, Self::AnomalousWorld, Self::CompressedSummary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OldTrace => "old_trace",
            Self::AnomalousWorld => "anomalous_world",
            Self::CompressedSummary => "compressed_summary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerturbationContent {
    Trace {
        agent: String,
        cycle: u64,
        description: String,
        #[serde(rename = "type")]
        kind: String,
    },
    Excerpt {
        #[serde(rename = "type")]
        category: String,
        title: String,
        excerpt: String,
    },
    Summary(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    #[serde(rename = "perturbation_type")]
    pub kind: PerturbationKind,
    pub description: String,
    pub content: PerturbationContent,
}

impl Perturbation {
    /// Pretty JSON as rendered into the think-step context.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}
