//! Derived metrics for human analysis of a CO-PRESENCE run.
//!
//! Everything here is a pure consumer of artifacts: per-artifact and
//! per-cycle structure metrics, a run summary with silence streaks and
//! profile evolution, and gaze orientation over time. None of it is ever
//! shown to the agents.

pub mod metrics;
pub mod model;
pub mod recorder;
pub mod summary;

pub use metrics::{agent_metrics, cycle_metrics};
pub use model::{AgentMetrics, AgentSummary, CycleMetrics, GazePoint, ProfileEvolution, RunSummary, SilenceStreaks};
pub use recorder::MetricsRecorder;
pub use summary::{gaze_orientation, summarize};

use std::path::PathBuf;

/// Errors from the observer subsystem.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    #[error("metrics I/O failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl ObserverError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
