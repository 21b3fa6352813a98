//! Cognitive profile: an agent's mutable preference vector.
//!
//! Four bounded weights in `[0, 1]` plus two categorical parameters. The
//! vector only changes through [`Profile::update`], which validates every
//! proposed key against its domain and records a history entry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// How abstract the agent prefers its reasoning to be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbstractionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl AbstractionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for AbstractionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown abstraction level '{other}'")),
        }
    }
}

impl fmt::Display for AbstractionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preferred structural complexity of the agent's artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTarget {
    Simple,
    Complex,
    #[default]
    Variable,
}

impl ComplexityTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Complex => "complex",
            Self::Variable => "variable",
        }
    }
}

impl FromStr for ComplexityTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "complex" => Ok(Self::Complex),
            "variable" => Ok(Self::Variable),
            other => Err(format!("unknown complexity target '{other}'")),
        }
    }
}

impl fmt::Display for ComplexityTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The preference vector. `Copy`, so snapshots never alias internal state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub abstraction_level: AbstractionLevel,

    /// 0 = leaves reasoning open, 1 = always closes
    #[serde(default = "default_half")]
    pub tendency_to_close: f64,

    /// Weight on own traces
    #[serde(default = "default_half")]
    pub self_focus: f64,

    /// Weight on the counterpart's traces
    #[serde(default = "default_half")]
    pub other_focus: f64,

    /// Tendency to consult the content pool
    #[serde(default = "default_world_focus")]
    pub world_focus: f64,

    #[serde(default)]
    pub complexity_target: ComplexityTarget,
}

fn default_half() -> f64 {
    0.5
}
fn default_world_focus() -> f64 {
    0.3
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            abstraction_level: AbstractionLevel::Medium,
            tendency_to_close: default_half(),
            self_focus: default_half(),
            other_focus: default_half(),
            world_focus: default_world_focus(),
            complexity_target: ComplexityTarget::Variable,
        }
    }
}

impl Preferences {
    /// Names of every parameter a change request may target.
    pub const KEYS: [&'static str; 6] = [
        "abstraction_level",
        "tendency_to_close",
        "self_focus",
        "other_focus",
        "world_focus",
        "complexity_target",
    ];

    /// Render the profile block for `agent_name`.
    pub fn to_prompt_context(&self, agent_name: &str) -> String {
        format!(
            "[COGNITIVE PROFILE - {}]\n\
             - Abstraction Level: {}\n\
             - Tendency to Close Reasoning: {:.2} (0=open, 1=closed)\n\
             - Self Focus: {:.2}\n\
             - Other Focus: {:.2}\n\
             - World Focus: {:.2}\n\
             - Complexity Target: {}",
            agent_name,
            self.abstraction_level,
            self.tendency_to_close,
            self.self_focus,
            self.other_focus,
            self.world_focus,
            self.complexity_target,
        )
    }

    /// Apply one proposed key. Returns the reason on rejection; `self` is
    /// untouched in that case.
    pub fn apply(&mut self, key: &str, value: &serde_json::Value) -> Result<(), String> {
        match key {
            "tendency_to_close" => self.tendency_to_close = bounded(value)?,
            "self_focus" => self.self_focus = bounded(value)?,
            "other_focus" => self.other_focus = bounded(value)?,
            "world_focus" => self.world_focus = bounded(value)?,
            "abstraction_level" => self.abstraction_level = categorical(value)?,
            "complexity_target" => self.complexity_target = categorical(value)?,
            other => return Err(format!("unknown parameter '{other}'")),
        }
        Ok(())
    }

    /// Check every numeric weight is inside [0, 1]. Names the first offender.
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("tendency_to_close", self.tendency_to_close),
            ("self_focus", self.self_focus),
            ("other_focus", self.other_focus),
            ("world_focus", self.world_focus),
        ];
        for (key, v) in weights {
            in_unit_range(v).map_err(|e| format!("{key}: {e}"))?;
        }
        Ok(())
    }
}

fn bounded(value: &serde_json::Value) -> Result<f64, String> {
    let v = value
        .as_f64()
        .ok_or_else(|| format!("expected a number, got {value}"))?;
    in_unit_range(v)
}

fn in_unit_range(v: f64) -> Result<f64, String> {
    if v.is_finite() && (0.0..=1.0).contains(&v) {
        Ok(v)
    } else {
        Err(format!("{v} is outside [0, 1]"))
    }
}

fn categorical<T: FromStr<Err = String>>(value: &serde_json::Value) -> Result<T, String> {
    value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {value}"))?
        .parse()
}

/// One entry of the change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileChange {
    /// Cycle whose artifact proposed the change
    #[serde(rename = "cycle_id")]
    pub cycle: u64,

    pub before: Preferences,

    /// The delta exactly as requested, including rejected keys
    pub changes: serde_json::Map<String, serde_json::Value>,

    pub after: Preferences,

    #[serde(default)]
    pub comment: String,
}

/// Persistent cognitive profile for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub agent_name: String,

    #[serde(default)]
    preferences: Preferences,

    #[serde(default)]
    history: Vec<ProfileChange>,
}

impl Profile {
    /// The documented default profile for an agent.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            preferences: Preferences::default(),
            history: Vec::new(),
        }
    }

    /// Current preferences, by value.
    pub fn snapshot(&self) -> Preferences {
        self.preferences
    }

    pub fn history(&self) -> &[ProfileChange] {
        &self.history
    }

    /// Apply a proposed change set.
    ///
    /// No-op for an empty set. Otherwise every valid key is applied, unknown
    /// keys and out-of-domain values are skipped, and exactly one history
    /// entry is recorded. Returns the keys that were applied.
    pub fn update(
        &mut self,
        proposed_changes: &serde_json::Map<String, serde_json::Value>,
        cycle: u64,
        comment: &str,
    ) -> Vec<String> {
        if proposed_changes.is_empty() {
            return Vec::new();
        }

        let before = self.preferences;
        let mut applied = Vec::new();

        for (key, value) in proposed_changes {
            match self.preferences.apply(key, value) {
                Ok(()) => applied.push(key.clone()),
                Err(reason) => warn!(
                    agent = %self.agent_name,
                    cycle,
                    key = %key,
                    %reason,
                    "Rejected profile change"
                ),
            }
        }

        debug!(agent = %self.agent_name, cycle, applied = ?applied, "Profile updated");

        self.history.push(ProfileChange {
            cycle,
            before,
            changes: proposed_changes.clone(),
            after: self.preferences,
            comment: comment.to_string(),
        });

        applied
    }

    /// Render the profile block shown to the agent each cycle.
    pub fn to_prompt_context(&self) -> String {
        self.preferences.to_prompt_context(&self.agent_name)
    }
}
