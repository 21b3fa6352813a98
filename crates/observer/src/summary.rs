//! Run summary, silence streaks, profile evolution and gaze orientation.

use copresence_core::artifact::Artifact;
use std::collections::BTreeMap;

use crate::model::{AgentSummary, GazePoint, ProfileEvolution, RunSummary, SilenceStreaks};

/// Summarize every artifact of a run. Agents appear in order of first
/// appearance.
pub fn summarize(artifacts: &[Artifact]) -> RunSummary {
    if artifacts.is_empty() {
        return RunSummary::default();
    }

    let by_agent = group_by_agent(artifacts);
    RunSummary {
        total_cycles: artifacts.iter().map(|a| a.cycle).max().unwrap_or(0),
        total_artifacts: artifacts.len(),
        agents: by_agent.iter().map(|(name, list)| agent_summary(name, list)).collect(),
        silence_analysis: by_agent.iter().map(|(name, list)| silence_streaks(name, list)).collect(),
    }
}

/// Attention weights over time for `agent_name`, ascending by cycle.
/// Artifacts without a snapshot are skipped.
pub fn gaze_orientation(artifacts: &[Artifact], agent_name: &str) -> Vec<GazePoint> {
    let mut own: Vec<&Artifact> = artifacts.iter().filter(|a| a.agent_name == agent_name).collect();
    own.sort_by_key(|a| (a.cycle, a.timestamp));
    own.into_iter()
        .filter_map(|a| {
            a.profile_snapshot.map(|p| GazePoint {
                cycle: a.cycle,
                self_focus: p.self_focus,
                other_focus: p.other_focus,
                world_focus: p.world_focus,
            })
        })
        .collect()
}

fn group_by_agent(artifacts: &[Artifact]) -> Vec<(String, Vec<&Artifact>)> {
    let mut groups: Vec<(String, Vec<&Artifact>)> = Vec::new();
    for artifact in artifacts {
        match groups.iter_mut().find(|(name, _)| *name == artifact.agent_name) {
            Some((_, list)) => list.push(artifact),
            None => groups.push((artifact.agent_name.clone(), vec![artifact])),
        }
    }
    // Stable: equal cycles keep log order.
    for (_, list) in &mut groups {
        list.sort_by_key(|a| a.cycle);
    }
    groups
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

fn agent_summary(name: &str, artifacts: &[&Artifact]) -> AgentSummary {
    let total = artifacts.len();
    let silent_count = artifacts.iter().filter(|a| a.silence_flag).count();
    let step_counts: Vec<usize> = artifacts.iter().map(|a| a.body.steps.len()).collect();

    let mut artifact_types = BTreeMap::new();
    for a in artifacts {
        *artifact_types.entry(a.kind.as_str().to_string()).or_insert(0) += 1;
    }

    let profile_evolution: Vec<ProfileEvolution> = artifacts
        .iter()
        .filter(|a| a.has_profile_update())
        .filter_map(|a| {
            a.profile_update.as_ref().map(|u| ProfileEvolution {
                cycle: a.cycle,
                changes: u.proposed_changes.clone(),
                comment: u.comment.clone(),
            })
        })
        .collect();

    AgentSummary {
        agent_name: name.to_string(),
        total_artifacts: total,
        silent_count,
        silence_rate: ratio(silent_count, total),
        avg_steps: ratio(step_counts.iter().sum(), step_counts.len()),
        max_steps: step_counts.iter().copied().max().unwrap_or(0),
        min_steps: step_counts.iter().copied().min().unwrap_or(0),
        artifact_types,
        profile_change_count: profile_evolution.len(),
        profile_change_rate: ratio(profile_evolution.len(), total),
        profile_evolution,
    }
}

/// Runs of consecutive silent artifacts. A streak still open at the end counts.
fn silence_streaks(name: &str, artifacts: &[&Artifact]) -> SilenceStreaks {
    let mut streaks = Vec::new();
    let mut current = 0usize;
    for a in artifacts {
        if a.silence_flag {
            current += 1;
        } else if current > 0 {
            streaks.push(current);
            current = 0;
        }
    }
    if current > 0 {
        streaks.push(current);
    }

    SilenceStreaks {
        agent_name: name.to_string(),
        total_streaks: streaks.len(),
        max_streak: streaks.iter().copied().max().unwrap_or(0),
        avg_streak: ratio(streaks.iter().sum(), streaks.len()),
    }
}
