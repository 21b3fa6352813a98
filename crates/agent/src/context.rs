//! Context rendering: turns a resolved think input into the user message.
//!
//! Sections, in order: cycle header, profile block, environment traces,
//! world content (when present), perturbation (when present). Rendering is
//! deterministic: identical inputs always produce identical text.

use copresence_core::artifact::Artifact;
use copresence_core::content::ContentEntry;
use copresence_core::think::ThinkInput;

/// Render the full user message for one think-step.
pub fn render_user_message(input: &ThinkInput) -> String {
    let mut parts = Vec::new();

    parts.push(format!("[CYCLE: {}]", input.cycle));
    parts.push(input.preferences.to_prompt_context(&input.self_name));

    if input.artifacts.is_empty() {
        parts.push("\n[ENVIRONMENT TRACES]\nNo traces available yet.".to_string());
    } else {
        parts.push("\n[ENVIRONMENT TRACES]".to_string());
        parts.extend(input.artifacts.iter().map(format_trace));
    }

    if !input.content.is_empty() {
        parts.push("\n[WORLD CONTENT]".to_string());
        parts.extend(input.content.iter().map(format_content));
    }

    if let Some(perturbation) = &input.perturbation {
        parts.push("\n[PERTURBATION - UNEXPECTED INPUT]".to_string());
        parts.push(perturbation.to_pretty_json());
    }

    parts.join("\n")
}

fn format_trace(trace: &Artifact) -> String {
    let steps = serde_json::to_string(&trace.body.steps).unwrap_or_else(|_| "[]".into());
    let meta = &trace.body.meta;
    format!(
        "\n--- Trace from {} (cycle {}) ---\n\
         Type: {}\n\
         Description: {}\n\
         Steps: {}\n\
         Meta-cognition: self_observation={:?}, influence_of_other_agent={:?}, uncertainties={:?}\n\
         Silence: {}\n",
        trace.agent_name,
        trace.cycle,
        trace.kind,
        trace.body.description,
        steps,
        meta.self_observation,
        meta.influence_of_other_agent,
        meta.uncertainties,
        trace.silence_flag,
    )
}

fn format_content(entry: &ContentEntry) -> String {
    format!(
        "\n--- World Content: {} ({}) ---\n{}\n",
        entry.title, entry.category, entry.body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use copresence_core::artifact::{ArtifactBody, ArtifactKind, MetaReflection, Step};
    use copresence_core::content::ContentCategory;
    use copresence_core::perturbation::{Perturbation, PerturbationContent, PerturbationKind};
    use copresence_core::profile::Preferences;

    fn input() -> ThinkInput {
        ThinkInput {
            cycle: 4,
            artifacts: vec![],
            content: vec![],
            perturbation: None,
            preferences: Preferences::default(),
            self_name: "Agent A".into(),
            other_name: "Agent B".into(),
        }
    }

    #[test]
    fn empty_context_says_no_traces() {
        let msg = render_user_message(&input());
        assert!(msg.starts_with("[CYCLE: 4]\n[COGNITIVE PROFILE - Agent A]"));
        assert!(msg.contains("[ENVIRONMENT TRACES]\nNo traces available yet."));
        assert!(!msg.contains("[WORLD CONTENT]"));
        assert!(!msg.contains("[PERTURBATION"));
    }

    #[test]
    fn sections_render_in_order() {
        let mut input = input();
        input.artifacts.push(Artifact::new(
            "Agent B",
            3,
            ArtifactKind::OpenQuestion,
            ArtifactBody {
                description: "Is a trace a memory?".into(),
                steps: vec![Step::new("open_end", "unclear")],
                meta: MetaReflection {
                    self_observation: "circling".into(),
                    influence_of_other_agent: "none".into(),
                    uncertainties: "all of it".into(),
                },
            },
        ));
        input.content.push(ContentEntry::new(
            "data_001",
            ContentCategory::Data,
            "Observation Frequencies",
            "cycle,self_focus",
        ));
        input.perturbation = Some(Perturbation {
            kind: PerturbationKind::CompressedSummary,
            description: "Imperfect compression of past traces".into(),
            content: PerturbationContent::Summary("[Agent B@1]: loops...".into()),
        });

        let msg = render_user_message(&input);
        let traces = msg.find("--- Trace from Agent B (cycle 3) ---").unwrap();
        let world = msg.find("--- World Content: Observation Frequencies (data) ---").unwrap();
        let perturbation = msg.find("[PERTURBATION - UNEXPECTED INPUT]").unwrap();
        assert!(traces < world && world < perturbation);
        assert!(msg.contains("Type: open_question"));
        assert!(msg.contains(r#"Steps: [{"label":"open_end","content":"unclear"}]"#));
        assert!(msg.contains("\"perturbation_type\": \"compressed_summary\""));
    }

    #[test]
    fn rendering_is_deterministic() {
        let input = input();
        assert_eq!(render_user_message(&input), render_user_message(&input));
    }
}
