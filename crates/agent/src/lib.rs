//! The LLM-backed co-presence agent.
//!
//! Each cycle the agent:
//!
//! 1. **Declares** what to read, driven by its cognitive profile
//! 2. **Receives** the resolved traces, world content and any perturbation
//! 3. **Renders** them into a context message under a fixed system prompt
//! 4. **Asks** the configured provider for one completion
//! 5. **Returns** the reply raw, for the kernel to interpret

pub mod context;
pub mod prompt;
pub mod requests;
pub mod thinker;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::render_user_message;
pub use prompt::system_prompt;
pub use requests::profile_read_requests;
pub use thinker::{LlmThinker, ThinkSettings};
