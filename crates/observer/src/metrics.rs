//! Per-artifact and per-cycle structure metrics.

use chrono::Utc;
use copresence_core::artifact::Artifact;

use crate::model::{AgentMetrics, CycleMetrics};

const OPEN_LABELS: [&str; 2] = ["open_end", "open_question"];
const CLOSING_LABELS: [&str; 2] = ["conclusion", "inference"];

pub fn agent_metrics(artifact: &Artifact) -> AgentMetrics {
    let steps = &artifact.body.steps;

    let open = steps.iter().filter(|s| OPEN_LABELS.contains(&s.label.as_str())).count();
    let closing = steps
        .iter()
        .filter(|s| CLOSING_LABELS.contains(&s.label.as_str()))
        .count();
    let open_end_ratio = match open + closing {
        0 => 0.0,
        total => open as f64 / total as f64,
    };

    let avg_step_length = if steps.is_empty() {
        0.0
    } else {
        steps.iter().map(|s| s.content.chars().count()).sum::<usize>() as f64 / steps.len() as f64
    };

    AgentMetrics {
        agent_name: artifact.agent_name.clone(),
        cycle: artifact.cycle,
        step_count: steps.len(),
        open_end_ratio,
        avg_step_length,
        is_silent: artifact.silence_flag,
        profile_changed: artifact.has_profile_update(),
        profile_changes: artifact
            .profile_update
            .as_ref()
            .map(|u| u.proposed_changes.clone())
            .unwrap_or_default(),
        artifact_type: artifact.kind.as_str().to_string(),
    }
}

/// Metrics for a cycle's pair of artifacts, first agent first.
pub fn cycle_metrics(first: Option<&Artifact>, second: Option<&Artifact>) -> CycleMetrics {
    let cycle = first.or(second).map(|a| a.cycle).unwrap_or(0);
    let first = first.map(agent_metrics);
    let second = second.map(agent_metrics);
    let both_silent = first.as_ref().is_some_and(|m| m.is_silent) && second.as_ref().is_some_and(|m| m.is_silent);

    CycleMetrics {
        cycle,
        timestamp: Utc::now(),
        first,
        second,
        both_silent,
    }
}
