//! Domain event system: decoupled reporting out of the cycle loop.
//!
//! The orchestrator publishes; consoles and recorders subscribe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::artifact::ArtifactKind;
use crate::perturbation::PerturbationKind;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A new cycle began
    CycleStarted {
        cycle: u64,
        timestamp: DateTime<Utc>,
    },

    /// A perturbation fired and was built
    PerturbationInjected {
        cycle: u64,
        kind: PerturbationKind,
        timestamp: DateTime<Utc>,
    },

    /// An artifact was durably appended to the log
    ArtifactAppended {
        cycle: u64,
        agent: String,
        artifact_id: String,
        kind: ArtifactKind,
        timestamp: DateTime<Utc>,
    },

    /// A profile change request was applied
    ProfileUpdated {
        cycle: u64,
        agent: String,
        applied: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    /// Think-step output could not be interpreted and was replaced
    OutputUnparseable {
        cycle: u64,
        agent: String,
        timestamp: DateTime<Utc>,
    },

    /// Best-effort retrieval indexing failed
    RetrievalIndexFailed {
        cycle: u64,
        agent: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_bus_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::PerturbationInjected {
            cycle: 10,
            kind: PerturbationKind::OldTrace,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::PerturbationInjected { cycle, kind, .. } => {
                assert_eq!(*cycle, 10);
                assert_eq!(*kind, PerturbationKind::OldTrace);
            }
            _ => panic!("Expected PerturbationInjected event"),
        }
    }

    #[test]
    fn event_bus_no_subscribers_doesnt_panic() {
        let bus = EventBus::new(16);
        bus.publish(DomainEvent::CycleStarted {
            cycle: 1,
            timestamp: Utc::now(),
        });
    }
}
