//! Output interpretation: raw think-step text to an artifact.
//!
//! Malformed output is data, not failure: anything that cannot be read as
//! an artifact becomes the well-formed `unparseable` fallback.

use copresence_core::artifact::{
    Artifact, ArtifactBody, ArtifactKind, MetaReflection, ProfileChangeRequest, Step,
};
use copresence_core::profile::Preferences;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// The outcome of interpreting one reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpretation {
    Parsed(Artifact),
    Fallback(Artifact),
}

impl Interpretation {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    pub fn artifact(&self) -> &Artifact {
        match self {
            Self::Parsed(a) | Self::Fallback(a) => a,
        }
    }

    pub fn into_artifact(self) -> Artifact {
        match self {
            Self::Parsed(a) | Self::Fallback(a) => a,
        }
    }
}

/// Interpret `raw` as `agent_name`'s artifact for `cycle`. The result always
/// carries `snapshot`.
pub fn interpret(raw: &str, agent_name: &str, cycle: u64, snapshot: Preferences) -> Interpretation {
    let value: Value = match serde_json::from_str(extract_json(raw)) {
        Ok(v) => v,
        Err(e) => {
            warn!(agent = %agent_name, cycle, error = %e, "Think-step output is not JSON");
            return Interpretation::Fallback(Artifact::fallback(agent_name, cycle, raw, snapshot));
        }
    };

    match build(&value, agent_name, cycle) {
        Ok(artifact) => {
            debug!(agent = %agent_name, cycle, kind = %artifact.kind, "Think-step output parsed");
            Interpretation::Parsed(artifact.with_snapshot(snapshot))
        }
        Err(e) => {
            warn!(agent = %agent_name, cycle, error = %e, "Think-step output is malformed");
            let info = format!("Parse error: {e}\n\nRaw: {raw}");
            Interpretation::Fallback(Artifact::fallback(agent_name, cycle, &info, snapshot))
        }
    }
}

/// Strip a Markdown fence, or fall back to the outermost brace pair.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest).trim_start();
        let rest = rest.trim_end();
        return rest.strip_suffix("```").unwrap_or(rest).trim_end();
    }

    if trimmed.starts_with('{') {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn build(value: &Value, agent_name: &str, cycle: u64) -> Result<Artifact, String> {
    let root = value.as_object().ok_or("expected a JSON object")?;

    let empty = Map::new();
    let body = object_field(root, "artifact")?.unwrap_or(&empty);
    let meta = object_field(body, "meta_cognition")?.unwrap_or(&empty);

    let steps = match body.get("steps") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(step).collect::<Result<Vec<_>, _>>()?,
        Some(other) => return Err(format!("artifact.steps must be a list, got {other}")),
    };

    let body = ArtifactBody {
        description: text_field(body, "description", "No description")?,
        steps,
        meta: MetaReflection {
            self_observation: text_field(meta, "self_observation", "Unable to observe self")?,
            influence_of_other_agent: text_field(meta, "influence_of_other_agent", "Unknown")?,
            uncertainties: text_field(meta, "uncertainties", "Cannot determine")?,
        },
    };

    let mut artifact = Artifact::new(agent_name, cycle, kind(root.get("artifact_type")), body)
        .with_silence(root.get("silence_flag").and_then(Value::as_bool).unwrap_or(false));

    if let Some(update) = root.get("profile_update").filter(|v| is_truthy(v)) {
        let update = update
            .as_object()
            .ok_or_else(|| format!("profile_update must be an object, got {update}"))?;
        artifact = artifact.with_profile_update(ProfileChangeRequest {
            proposed_changes: object_field(update, "proposed_changes")?.cloned().unwrap_or_default(),
            comment: text_field(update, "comment", "")?,
        });
    }

    Ok(artifact)
}

/// Unknown categories, and the orchestration-only `unparseable`, read as
/// `partial_theory`.
fn kind(value: Option<&Value>) -> ArtifactKind {
    match value.and_then(Value::as_str).map(str::parse::<ArtifactKind>) {
        Some(Ok(ArtifactKind::Unparseable)) | Some(Err(_)) | None => ArtifactKind::PartialTheory,
        Some(Ok(kind)) => kind,
    }
}

fn step(value: &Value) -> Result<Step, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("step must be an object, got {value}"))?;
    match (obj.get("label"), obj.get("content")) {
        (Some(Value::String(label)), Some(Value::String(content))) => Ok(Step::new(label, content)),
        _ => Err(format!("step needs string label and content, got {value}")),
    }
}

fn object_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Map<String, Value>>, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(other) => Err(format!("{key} must be an object, got {other}")),
    }
}

fn text_field(obj: &Map<String, Value>, key: &str, default: &str) -> Result<String, String> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("{key} must be a string, got {other}")),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
