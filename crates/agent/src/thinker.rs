//! LLM-backed think-step.
//!
//! One chat completion per cycle: system prompt plus the rendered context.
//! The reply is handed back raw; interpreting it is the kernel's job.

use async_trait::async_trait;
use copresence_core::error::ProviderError;
use copresence_core::message::Message;
use copresence_core::provider::{Provider, ProviderRequest};
use copresence_core::request::ReadRequest;
use copresence_core::think::{ReadContext, ThinkInput, ThinkOutput, Thinker};
use std::sync::Arc;
use tracing::{debug, info};

use crate::context::render_user_message;
use crate::prompt::system_prompt;
use crate::requests::profile_read_requests;

/// Sampling settings for the completion call.
#[derive(Debug, Clone)]
pub struct ThinkSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ThinkSettings {
    pub fn from_config(config: &copresence_config::AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: Some(config.max_tokens),
        }
    }
}

/// A think-step that asks an LLM.
pub struct LlmThinker {
    name: String,
    counterpart: String,
    provider: Arc<dyn Provider>,
    settings: ThinkSettings,
    system_prompt: String,
}

impl LlmThinker {
    pub fn new(
        name: impl Into<String>,
        counterpart: impl Into<String>,
        provider: Arc<dyn Provider>,
        settings: ThinkSettings,
    ) -> Self {
        let name = name.into();
        let counterpart = counterpart.into();
        let system_prompt = system_prompt(&name, &counterpart);
        Self {
            name,
            counterpart,
            provider,
            settings,
            system_prompt,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn build_request(&self, input: &ThinkInput) -> ProviderRequest {
        ProviderRequest {
            model: self.settings.model.clone(),
            messages: vec![
                Message::system(self.system_prompt.clone()),
                Message::user(render_user_message(input)),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        }
    }
}

#[async_trait]
impl Thinker for LlmThinker {
    fn name(&self) -> &str {
        &self.name
    }

    fn counterpart(&self) -> &str {
        &self.counterpart
    }

    fn read_requests(&self, ctx: ReadContext<'_>) -> Vec<ReadRequest> {
        profile_read_requests(&self.name, &self.counterpart, ctx)
    }

    async fn think(&self, input: &ThinkInput) -> Result<ThinkOutput, ProviderError> {
        let request = self.build_request(input);
        debug!(
            agent = %self.name,
            cycle = input.cycle,
            traces = input.artifacts.len(),
            content = input.content.len(),
            perturbation = input.perturbation.is_some(),
            "Thinking"
        );

        let response = self.provider.complete(request).await?;

        if let Some(usage) = response.usage {
            info!(
                agent = %self.name,
                cycle = input.cycle,
                provider = %self.provider.name(),
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Think-step complete"
            );
        }

        Ok(ThinkOutput::Raw(response.message.content))
    }
}
