//! Data model for derived metrics and run summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ── Per-artifact ──────────────────────────────────────────────────────────

/// Structure metrics for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub agent_name: String,
    #[serde(rename = "cycle_id")]
    pub cycle: u64,
    pub step_count: usize,
    /// Open steps over open plus closing steps; 0 when there are neither.
    pub open_end_ratio: f64,
    /// Mean step length in characters.
    pub avg_step_length: f64,
    pub is_silent: bool,
    pub profile_changed: bool,
    /// The proposed change set, exactly as requested.
    #[serde(default)]
    pub profile_changes: serde_json::Map<String, serde_json::Value>,
    pub artifact_type: String,
}

// ── Per-cycle ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleMetrics {
    #[serde(rename = "cycle_id")]
    pub cycle: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "agent_a")]
    pub first: Option<AgentMetrics>,
    #[serde(rename = "agent_b")]
    pub second: Option<AgentMetrics>,
    pub both_silent: bool,
}

// ── Run summary ───────────────────────────────────────────────────────────

/// One proposed profile change, as recorded on an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileEvolution {
    #[serde(rename = "cycle_id")]
    pub cycle: u64,
    pub changes: serde_json::Map<String, serde_json::Value>,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent_name: String,
    pub total_artifacts: usize,
    pub silent_count: usize,
    pub silence_rate: f64,
    pub avg_steps: f64,
    pub max_steps: usize,
    pub min_steps: usize,
    /// Category name to count.
    pub artifact_types: BTreeMap<String, usize>,
    pub profile_change_count: usize,
    pub profile_change_rate: f64,
    /// Ascending by cycle.
    pub profile_evolution: Vec<ProfileEvolution>,
}

/// Consecutive-silence analysis for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceStreaks {
    pub agent_name: String,
    pub total_streaks: usize,
    pub max_streak: usize,
    pub avg_streak: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The latest cycle in the log.
    pub total_cycles: u64,
    pub total_artifacts: usize,
    /// In order of first appearance.
    pub agents: Vec<AgentSummary>,
    pub silence_analysis: Vec<SilenceStreaks>,
}

impl RunSummary {
    pub fn agent(&self, name: &str) -> Option<&AgentSummary> {
        self.agents.iter().find(|a| a.agent_name == name)
    }

    pub fn silence(&self, name: &str) -> Option<&SilenceStreaks> {
        self.silence_analysis.iter().find(|s| s.agent_name == name)
    }
}

// ── Gaze ──────────────────────────────────────────────────────────────────

/// Attention weights recorded on one artifact's profile snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazePoint {
    #[serde(rename = "cycle_id")]
    pub cycle: u64,
    pub self_focus: f64,
    pub other_focus: f64,
    pub world_focus: f64,
}
