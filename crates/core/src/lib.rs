//! # CO-PRESENCE Core
//!
//! Domain types, traits, and error definitions for the two-agent
//! co-presence simulation. This crate has **zero framework dependencies**:
//! it defines the domain model every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every collaborator the cycle loop talks to is a trait here (think-step,
//! retrieval store, LLM provider). Implementations live in their respective
//! crates, which keeps the orchestration testable with scripted stand-ins.

pub mod artifact;
pub mod content;
pub mod error;
pub mod event;
pub mod message;
pub mod perturbation;
pub mod profile;
pub mod provider;
pub mod query;
pub mod request;
pub mod retrieval;
pub mod think;

// Re-export key types at crate root for ergonomics
pub use artifact::{Artifact, ArtifactBody, ArtifactKind, MetaReflection, ProfileChangeRequest, Step};
pub use content::{ContentCategory, ContentEntry};
pub use error::{Error, ProviderError, RequestError, StoreError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, Role};
pub use perturbation::{Perturbation, PerturbationContent, PerturbationKind};
pub use profile::{AbstractionLevel, ComplexityTarget, Preferences, Profile, ProfileChange};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use query::{ArtifactQuery, SortOrder};
pub use request::{PoolQuery, ReadRequest};
pub use retrieval::RetrievalStore;
pub use think::{ReadContext, ThinkInput, ThinkOutput, Thinker};
