//! LLM provider implementations for CO-PRESENCE.
//!
//! All providers implement the `copresence_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
