//! Thinker trait: the external think-step collaborator.
//!
//! A thinker declares what it wants to read, then turns a resolved context
//! bundle into either a finished artifact or raw text that the orchestration
//! layer interprets.

use async_trait::async_trait;

use crate::artifact::Artifact;
use crate::content::ContentEntry;
use crate::error::ProviderError;
use crate::perturbation::Perturbation;
use crate::profile::Preferences;
use crate::request::ReadRequest;

/// What a thinker sees of the world when declaring read-requests.
#[derive(Debug, Clone, Copy)]
pub struct ReadContext<'a> {
    pub cycle: u64,
    pub preferences: &'a Preferences,
    pub log_count: usize,
    pub pool_available: bool,
}

/// The context bundle for one think-step.
#[derive(Debug, Clone)]
pub struct ThinkInput {
    pub cycle: u64,
    /// Resolved prior artifacts, deduplicated, in first-seen order
    pub artifacts: Vec<Artifact>,
    /// Resolved pool entries, deduplicated, in first-seen order
    pub content: Vec<ContentEntry>,
    /// Identical for every agent within a cycle
    pub perturbation: Option<Perturbation>,
    pub preferences: Preferences,
    pub self_name: String,
    pub other_name: String,
}

/// What a think-step hands back.
#[derive(Debug, Clone)]
pub enum ThinkOutput {
    /// Already structured
    Artifact(Box<Artifact>),
    /// Text to be interpreted; may be malformed
    Raw(String),
}

#[async_trait]
pub trait Thinker: Send + Sync {
    /// The agent's own name, as recorded on its artifacts.
    fn name(&self) -> &str;

    /// The counterpart agent's name.
    fn counterpart(&self) -> &str;

    /// Declare what to read this cycle.
    fn read_requests(&self, ctx: ReadContext<'_>) -> Vec<ReadRequest>;

    /// Produce this cycle's output. Errors are transport failures, not
    /// malformed output.
    async fn think(&self, input: &ThinkInput) -> Result<ThinkOutput, ProviderError>;
}
