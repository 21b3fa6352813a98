//! Configuration loading, validation, and management for CO-PRESENCE.
//!
//! Loads configuration from `./copresence.toml` (or an explicit path) with
//! environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "copresence.toml";

/// The root configuration structure.
///
/// Maps directly to `copresence.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the OpenAI-compatible endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat-completions base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per think-step reply
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Root of every persisted file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub perturbation: PerturbationConfig,

    #[serde(default)]
    pub agents: AgentsConfig,

    #[serde(default)]
    pub run: RunConfig,
}

fn default_base_url() -> String {
    "https://api.deepseek.com/v1".into()
}
fn default_model() -> String {
    "deepseek-chat".into()
}
fn default_temperature() -> f32 {
    0.8
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("data_dir", &self.data_dir)
            .field("perturbation", &self.perturbation)
            .field("agents", &self.agents)
            .field("run", &self.run)
            .finish()
    }
}

/// Perturbation scheduling, in cycles between firings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerturbationConfig {
    #[serde(default = "default_min_gap")]
    pub min_gap: u64,

    #[serde(default = "default_max_gap")]
    pub max_gap: u64,
}

fn default_min_gap() -> u64 {
    10
}
fn default_max_gap() -> u64 {
    30
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            min_gap: default_min_gap(),
            max_gap: default_max_gap(),
        }
    }
}

/// The two agents, in turn order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_first_agent")]
    pub first: String,

    #[serde(default = "default_second_agent")]
    pub second: String,
}

fn default_first_agent() -> String {
    "Agent A".into()
}
fn default_second_agent() -> String {
    "Agent B".into()
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            first: default_first_agent(),
            second: default_second_agent(),
        }
    }
}

/// Defaults for `copresence run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_cycles")]
    pub default_cycles: u64,

    /// Write `artifacts/cycle_NNNN.json` into the run directory
    #[serde(default = "default_true")]
    pub save_each_cycle: bool,
}

fn default_cycles() -> u64 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            default_cycles: default_cycles(),
            save_each_cycle: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from `./copresence.toml`, then apply environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(Path::new(CONFIG_FILE))
    }

    /// Load from an explicit path, then apply environment overrides:
    /// - `COPRESENCE_API_KEY`, then `OPENAI_API_KEY`
    /// - `OPENAI_BASE_URL`, `LLM_MODEL`, `DATA_DIR`
    /// - `PERTURBATION_MIN_CYCLES`, `PERTURBATION_MAX_CYCLES`
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup, then re-validate.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("COPRESENCE_API_KEY").or_else(|| non_empty("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty("OPENAI_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = non_empty("LLM_MODEL") {
            self.model = model;
        }
        if let Some(dir) = non_empty("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = non_empty("PERTURBATION_MIN_CYCLES") {
            self.perturbation.min_gap = parse_env("PERTURBATION_MIN_CYCLES", &raw)?;
        }
        if let Some(raw) = non_empty("PERTURBATION_MAX_CYCLES") {
            self.perturbation.max_gap = parse_env("PERTURBATION_MAX_CYCLES", &raw)?;
        }

        self.validate()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.perturbation.min_gap == 0 {
            return Err(ConfigError::ValidationError(
                "perturbation.min_gap must be at least 1".into(),
            ));
        }

        if self.perturbation.min_gap > self.perturbation.max_gap {
            return Err(ConfigError::ValidationError(format!(
                "perturbation.min_gap ({}) must not exceed max_gap ({})",
                self.perturbation.min_gap, self.perturbation.max_gap
            )));
        }

        let (first, second) = (self.agents.first.trim(), self.agents.second.trim());
        if first.is_empty() || second.is_empty() {
            return Err(ConfigError::ValidationError("agent names must not be empty".into()));
        }
        if first == second {
            return Err(ConfigError::ValidationError("agent names must be distinct".into()));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    pub fn artifact_log_path(&self) -> PathBuf {
        self.data_dir.join("environment").join("artifacts.jsonl")
    }

    pub fn content_pool_path(&self) -> PathBuf {
        self.data_dir.join("world").join("content.jsonl")
    }

    /// Profile file for the first (`0`) or second (`1`) agent.
    pub fn profile_path(&self, slot: usize) -> PathBuf {
        self.data_dir
            .join("profiles")
            .join(format!("profile_{}.json", slot_suffix(slot)))
    }

    /// Retrieval index for the first (`0`) or second (`1`) agent.
    pub fn retrieval_index_path(&self, slot: usize) -> PathBuf {
        self.data_dir
            .join(format!("rag_{}", slot_suffix(slot)))
            .join("index.jsonl")
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.data_dir.join("runs")
    }
}

fn slot_suffix(slot: usize) -> &'static str {
    if slot == 0 { "a" } else { "b" }
}

fn parse_env(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::ValidationError(format!("{key} must be a positive integer, got {raw:?}")))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            data_dir: default_data_dir(),
            perturbation: PerturbationConfig::default(),
            agents: AgentsConfig::default(),
            run: RunConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
