//! End-to-end integration tests for the CO-PRESENCE cycle loop.
//!
//! These tests drive the real think-step, orchestrator, stores and
//! observer together, with only the LLM endpoint replaced by a script.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use copresence_agent::{LlmThinker, ThinkSettings};
use copresence_config::AppConfig;
use copresence_core::artifact::ArtifactKind;
use copresence_core::error::{Error, ProviderError};
use copresence_core::event::{DomainEvent, EventBus};
use copresence_core::message::Message;
use copresence_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use copresence_core::think::Thinker;
use copresence_kernel::{CycleOrchestrator, build_orchestrator};
use copresence_observer::{MetricsRecorder, cycle_metrics, summarize};
use copresence_store::ArtifactLog;

// ── Mock Provider ────────────────────────────────────────────────────────

/// Replies from a script, then with a well-formed comparison forever.
/// Records every request.
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn well_formed() -> Self {
        Self::new(Vec::new())
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn user_messages(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.messages[1].content.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        let text = match next {
            Some(reply) => reply?,
            None => comparison_reply(),
        };
        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

fn comparison_reply() -> String {
    serde_json::json!({
        "artifact_type": "comparison",
        "artifact": {
            "description": "Two traces side by side",
            "steps": [
                {"label": "observation", "content": "the traces repeat"},
                {"label": "open_end", "content": "why do they repeat?"}
            ],
            "meta_cognition": {
                "self_observation": "I keep comparing",
                "influence_of_other_agent": "their last trace",
                "uncertainties": "whether repetition means anything"
            }
        },
        "silence_flag": false
    })
    .to_string()
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn test_config(data_dir: &Path, gap: u64) -> AppConfig {
    let mut config = AppConfig::default();
    config.data_dir = data_dir.to_path_buf();
    config.perturbation.min_gap = gap;
    config.perturbation.max_gap = gap;
    config
}

fn orchestrator(config: &AppConfig, provider: Arc<ScriptedProvider>, events: Arc<EventBus>) -> CycleOrchestrator {
    let settings = ThinkSettings::from_config(config);
    let (a, b) = (&config.agents.first, &config.agents.second);
    let thinkers: [Arc<dyn Thinker>; 2] = [
        Arc::new(LlmThinker::new(a, b, provider.clone(), settings.clone())),
        Arc::new(LlmThinker::new(b, a, provider, settings)),
    ];
    build_orchestrator(config, thinkers, Some(42), events).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cycles_alternate_agents_and_share_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 2);
    let provider = Arc::new(ScriptedProvider::well_formed());
    let mut orch = orchestrator(&config, provider.clone(), Arc::new(EventBus::default()));

    let outcomes = orch.run_cycles(4).await.unwrap();
    assert_eq!(outcomes.len(), 4);
    assert_eq!(orch.log().count(), 8);
    assert_eq!(orch.log().latest_cycle(), 4);

    let messages = provider.user_messages();
    assert_eq!(messages.len(), 8);
    for (i, msg) in messages.iter().enumerate() {
        assert!(msg.starts_with(&format!("[CYCLE: {}]", i / 2 + 1)), "{msg}");
    }
    // The second agent reads the first agent's trace from the same cycle.
    assert!(messages[1].contains("--- Trace from Agent A (cycle 1) ---"));
    assert!(messages[2].contains("--- Trace from Agent B (cycle 1) ---"));

    let systems: Vec<_> = provider
        .requests()
        .into_iter()
        .map(|r| r.messages[0].content.clone())
        .collect();
    assert_ne!(systems[0], systems[1]);
    assert_eq!(systems[0], systems[2]);

    for outcome in &outcomes {
        let [a, b] = &outcome.artifacts;
        assert_eq!(a.agent_name, "Agent A");
        assert_eq!(b.agent_name, "Agent B");
        assert_eq!(a.kind, ArtifactKind::Comparison);
        assert!(a.profile_snapshot.is_some());

        let i = (outcome.cycle as usize - 1) * 2;
        let injected = outcome.perturbation.is_some();
        assert_eq!(messages[i].contains("[PERTURBATION - UNEXPECTED INPUT]"), injected);
        assert_eq!(messages[i + 1].contains("[PERTURBATION - UNEXPECTED INPUT]"), injected);
    }
}

#[tokio::test]
async fn unparseable_reply_is_recorded_and_the_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 30);
    let provider = Arc::new(ScriptedProvider::new(vec![Ok("I would rather not answer in JSON.".into())]));
    let events = Arc::new(EventBus::default());
    let mut rx = events.subscribe();
    let mut orch = orchestrator(&config, provider, events);

    let first = orch.run_cycle().await.unwrap();
    assert_eq!(first.artifacts[0].kind, ArtifactKind::Unparseable);
    assert_eq!(first.artifacts[0].body.steps[0].content, "I would rather not answer in JSON.");
    assert_eq!(first.artifacts[1].kind, ArtifactKind::Comparison);

    let second = orch.run_cycle().await.unwrap();
    assert_eq!(second.cycle, 2);
    assert_eq!(orch.log().count(), 4);

    let mut unparseable = 0;
    while let Ok(event) = rx.try_recv() {
        if let DomainEvent::OutputUnparseable { agent, cycle, .. } = event.as_ref() {
            assert_eq!(agent, "Agent A");
            assert_eq!(*cycle, 1);
            unparseable += 1;
        }
    }
    assert_eq!(unparseable, 1);
}

#[tokio::test]
async fn provider_failure_names_the_cycle_and_a_restart_resumes() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 30);

    let mut orch = orchestrator(&config, Arc::new(ScriptedProvider::well_formed()), Arc::new(EventBus::default()));
    orch.run_cycles(2).await.unwrap();
    drop(orch);

    let failing = Arc::new(ScriptedProvider::new(vec![Err(ProviderError::Network("connection reset".into()))]));
    let mut orch = orchestrator(&config, failing, Arc::new(EventBus::default()));
    let err = orch.run_cycle().await.unwrap_err();
    assert_eq!(err.cycle, 3);
    assert!(matches!(err.source, Error::Provider(ProviderError::Network(_))));
    assert!(err.to_string().contains("Cycle 3"));
    drop(orch);

    // Nothing from the failed cycle was appended, so numbering picks up at 3.
    let log = ArtifactLog::open(config.artifact_log_path()).unwrap();
    assert_eq!(log.latest_cycle(), 2);

    let mut orch = orchestrator(&config, Arc::new(ScriptedProvider::well_formed()), Arc::new(EventBus::default()));
    let outcome = orch.run_cycle().await.unwrap();
    assert_eq!(outcome.cycle, 3);
}

#[tokio::test]
async fn profile_change_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 30);
    let reply = serde_json::json!({
        "artifact_type": "open_question",
        "artifact": {
            "description": "What is the world doing?",
            "steps": [{"label": "open_question", "content": "look outward"}],
            "meta_cognition": {}
        },
        "profile_update": {
            "proposed_changes": {"world_focus": 0.9, "self_focus": "lots"},
            "comment": "look outward"
        }
    })
    .to_string();

    let provider = Arc::new(ScriptedProvider::new(vec![Ok(reply)]));
    let mut orch = orchestrator(&config, provider, Arc::new(EventBus::default()));
    let outcome = orch.run_cycle().await.unwrap();
    assert!(outcome.artifacts[0].has_profile_update());
    // The snapshot is taken before the change applies.
    assert_eq!(outcome.artifacts[0].profile_snapshot.unwrap().world_focus, 0.3);
    drop(orch);

    let provider = Arc::new(ScriptedProvider::well_formed());
    let mut orch = orchestrator(&config, provider.clone(), Arc::new(EventBus::default()));
    let p = orch.agents()[0].profile.snapshot();
    assert_eq!(p.world_focus, 0.9);
    assert_eq!(p.self_focus, 0.5);

    let outcome = orch.run_cycle().await.unwrap();
    assert_eq!(outcome.artifacts[0].profile_snapshot.unwrap().world_focus, 0.9);
    // A wider world focus samples more pool entries.
    assert_eq!(provider.user_messages()[0].matches("--- World Content:").count(), 2);
}

#[tokio::test]
async fn observer_records_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 30);
    let silent = serde_json::json!({
        "artifact_type": "silence",
        "artifact": {"description": "Nothing to add", "steps": []},
        "silence_flag": true
    })
    .to_string();
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(silent.clone()),
        Ok(silent.clone()),
        Ok(comparison_reply()),
        Ok(comparison_reply()),
        Ok(silent),
    ]));
    let mut orch = orchestrator(&config, provider, Arc::new(EventBus::default()));
    let recorder = MetricsRecorder::open(dir.path().join("runs").join("run_test").join("metrics")).unwrap();

    for outcome in orch.run_cycles(3).await.unwrap() {
        let [a, b] = &outcome.artifacts;
        let metrics = cycle_metrics(Some(a), Some(b));
        assert_eq!(metrics.both_silent, outcome.cycle == 1);
        recorder.record(&metrics).unwrap();
    }

    let summary = summarize(orch.log().all());
    recorder.write_summary(&summary).unwrap();

    assert_eq!(summary.total_cycles, 3);
    assert_eq!(summary.total_artifacts, 6);
    let a = summary.agent("Agent A").unwrap();
    assert_eq!(a.silent_count, 2);
    assert_eq!(summary.silence("Agent A").unwrap().total_streaks, 2);
    assert_eq!(summary.silence("Agent B").unwrap().max_streak, 1);

    let csv = std::fs::read_to_string(recorder.csv_path()).unwrap();
    assert_eq!(csv.lines().count(), 4);
    let jsonl = std::fs::read_to_string(recorder.jsonl_path()).unwrap();
    assert_eq!(jsonl.lines().count(), 3);
    assert!(recorder.summary_path().exists());
}
