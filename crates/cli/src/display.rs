//! Console rendering for artifacts and run summaries.

use copresence_core::artifact::Artifact;
use copresence_core::perturbation::Perturbation;
use copresence_observer::RunSummary;

const DESCRIPTION_CHARS: usize = 100;

/// Truncate to `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn print_cycle_header(cycle: u64) {
    println!();
    println!("  ── Cycle {cycle} ──────────────────────────────────");
}

pub fn print_perturbation(p: &Perturbation) {
    println!("  [perturbation] {}: {}", p.kind.as_str(), p.description);
}

pub fn print_artifact(artifact: &Artifact) {
    println!();
    println!("  ┌ {} (cycle {})", artifact.agent_name, artifact.cycle);
    println!("  │ Type:        {}", artifact.kind);
    println!(
        "  │ Description: {}",
        truncate(&artifact.body.description, DESCRIPTION_CHARS)
    );
    println!("  │ Steps:       {}", artifact.body.steps.len());
    println!(
        "  │ Silent:      {}",
        if artifact.silence_flag { "Yes" } else { "No" }
    );
    if let Some(update) = artifact.profile_update.as_ref().filter(|_| artifact.has_profile_update()) {
        let changes = serde_json::to_string(&update.proposed_changes).unwrap_or_default();
        println!("  │ Profile:     {changes}");
    }
    println!("  └ {}", artifact.id);
}

/// One line per artifact, for `copresence log`.
pub fn print_log_line(artifact: &Artifact) {
    println!(
        "  [{:>4}] {:<10} {:<16} {}{}",
        artifact.cycle,
        artifact.agent_name,
        artifact.kind.as_str(),
        truncate(&artifact.body.description, DESCRIPTION_CHARS),
        if artifact.silence_flag { " (silent)" } else { "" }
    );
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("  Run Summary");
    println!("  ===========");
    println!("  Total cycles:    {}", summary.total_cycles);
    println!("  Total artifacts: {}", summary.total_artifacts);

    for agent in &summary.agents {
        println!();
        println!("  {}", agent.agent_name);
        println!("    Artifacts:       {}", agent.total_artifacts);
        println!(
            "    Silence:         {} ({:.1}%)",
            agent.silent_count,
            agent.silence_rate * 100.0
        );
        println!(
            "    Steps:           avg {:.1}, min {}, max {}",
            agent.avg_steps, agent.min_steps, agent.max_steps
        );
        println!(
            "    Profile changes: {} ({:.1}%)",
            agent.profile_change_count,
            agent.profile_change_rate * 100.0
        );
        let types: Vec<String> = agent
            .artifact_types
            .iter()
            .map(|(kind, n)| format!("{kind}={n}"))
            .collect();
        println!("    Types:           {}", types.join(", "));

        if let Some(streaks) = summary.silence(&agent.agent_name) {
            println!(
                "    Silence streaks: {} (max {}, avg {:.1})",
                streaks.total_streaks, streaks.max_streak, streaks.avg_streak
            );
        }
    }
    println!();
}
