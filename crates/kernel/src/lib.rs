//! # CO-PRESENCE Kernel
//!
//! The orchestration core: read-request resolution, the perturbation
//! schedule, think-step output interpretation and the cycle loop that ties
//! them to the stores.

pub mod interpret;
pub mod orchestrator;
pub mod perturbation;
pub mod resolver;
pub mod setup;

pub use interpret::{Interpretation, interpret};
pub use orchestrator::{AgentSlot, CycleError, CycleOrchestrator, CycleOutcome, OrchestratorOptions};
pub use perturbation::{PerturbationScheduler, ScheduleError};
pub use resolver::{RequestResolver, ResolvedContext};
pub use setup::{SetupError, build_orchestrator, open_shared_stores};
