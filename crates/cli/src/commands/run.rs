//! `copresence run`: Run simulation cycles and record the run.

use chrono::{DateTime, Local};
use copresence_agent::{LlmThinker, ThinkSettings};
use copresence_core::event::{DomainEvent, EventBus};
use copresence_core::provider::Provider;
use copresence_core::think::Thinker;
use copresence_kernel::{CycleOrchestrator, CycleOutcome, build_orchestrator};
use copresence_observer::{MetricsRecorder, cycle_metrics, summarize};
use copresence_providers::OpenAiCompatProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tracing::info;

use super::CommandResult;
use crate::display;

pub struct RunOptions {
    pub cycles: Option<u64>,
    pub model: Option<String>,
    pub no_save: bool,
    pub seed: Option<u64>,
}

pub async fn run(path: Option<&Path>, options: RunOptions) -> CommandResult {
    let mut config = super::load_config(path)?;
    if let Some(model) = options.model {
        config.model = model;
    }

    // Fail early with setup guidance when no key is configured
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    COPRESENCE_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY     = 'sk-...'");
        eprintln!();
        eprintln!("  Or add `api_key` to {}", super::config_path(path).display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider: Arc<dyn Provider> = Arc::new(OpenAiCompatProvider::from_config(&config)?);
    let settings = ThinkSettings::from_config(&config);
    let (first, second) = (&config.agents.first, &config.agents.second);
    let thinkers: [Arc<dyn Thinker>; 2] = [
        Arc::new(LlmThinker::new(first, second, provider.clone(), settings.clone())),
        Arc::new(LlmThinker::new(second, first, provider, settings)),
    ];

    let events = Arc::new(EventBus::default());
    let mut rx = events.subscribe();
    let mut orchestrator = build_orchestrator(&config, thinkers, options.seed, events)?;

    let run_dir = config.runs_dir().join(run_dir_name(Local::now()));
    let recorder = MetricsRecorder::open(run_dir.join("metrics"))?;
    let save_cycles = config.run.save_each_cycle && !options.no_save;
    let cycles = options.cycles.unwrap_or(config.run.default_cycles);

    println!();
    println!("  CO-PRESENCE: {} / {}", first, second);
    println!("  Model:          {}", config.model);
    println!("  Cycles:         {cycles}");
    println!("  Resuming after: cycle {}", orchestrator.current_cycle());
    println!(
        "  Perturbation:   next due at cycle {}",
        orchestrator.next_perturbation_due()
    );
    println!("  Run directory:  {}", run_dir.display());
    info!(cycles, run_dir = %run_dir.display(), "Starting run");

    for _ in 0..cycles {
        display::print_cycle_header(orchestrator.current_cycle() + 1);

        let outcome = match orchestrator.run_cycle().await {
            Ok(outcome) => outcome,
            Err(e) => {
                drain_events(&mut rx);
                eprintln!("  Error in cycle {}: {}", e.cycle, e.source);
                return Err(e.into());
            }
        };

        if let Some(p) = &outcome.perturbation {
            display::print_perturbation(p);
        }
        for artifact in &outcome.artifacts {
            display::print_artifact(artifact);
        }
        drain_events(&mut rx);

        let [a, b] = &outcome.artifacts;
        recorder.record(&cycle_metrics(Some(a), Some(b)))?;

        if save_cycles {
            write_cycle_file(&run_dir, &outcome)?;
        }
    }

    write_final_profiles(&run_dir, &orchestrator)?;

    let summary = summarize(orchestrator.log().all());
    recorder.write_summary(&summary)?;
    display::print_summary(&summary);

    println!("  Run complete. Results saved to: {}", run_dir.display());
    println!();
    Ok(())
}

/// `run_YYYYmmdd_HHMMSS`, local time.
fn run_dir_name(now: DateTime<Local>) -> String {
    format!("run_{}", now.format("%Y%m%d_%H%M%S"))
}

fn cycle_file_path(run_dir: &Path, cycle: u64) -> PathBuf {
    run_dir.join("artifacts").join(format!("cycle_{cycle:04}.json"))
}

fn write_cycle_file(run_dir: &Path, outcome: &CycleOutcome) -> CommandResult {
    let path = cycle_file_path(run_dir, outcome.cycle);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let [a, b] = &outcome.artifacts;
    let json = serde_json::json!({
        "cycle_id": outcome.cycle,
        "agent_a": a,
        "agent_b": b,
    });
    std::fs::write(&path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

fn write_final_profiles(run_dir: &Path, orchestrator: &CycleOrchestrator) -> CommandResult {
    let dir = run_dir.join("final_profiles");
    std::fs::create_dir_all(&dir)?;
    for (store, slot) in orchestrator.profiles().zip(["a", "b"]) {
        store.save_to(&dir.join(format!("agent_{slot}_profile.json")))?;
    }
    Ok(())
}

/// Report the events the last cycle published that the panels don't show.
fn drain_events(rx: &mut Receiver<Arc<DomainEvent>>) {
    while let Ok(event) = rx.try_recv() {
        match event.as_ref() {
            DomainEvent::ProfileUpdated { agent, applied, .. } => {
                println!("  [profile] {agent} updated: {}", applied.join(", "));
            }
            DomainEvent::OutputUnparseable { agent, .. } => {
                println!("  [warning] {agent}: output could not be interpreted");
            }
            DomainEvent::RetrievalIndexFailed {
                agent, error_message, ..
            } => {
                println!("  [warning] {agent}: retrieval index failed: {error_message}");
            }
            _ => {}
        }
    }
}
