//! Outbound notifications about what the hunter decided.

use crate::state::AgentState;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use hunter_common::{EntityId, Point3};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Something an observer (audio, UI, the simulation log) may react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HunterEvent {
    /// Behavior state changed
    StateChanged {
        /// Previous state
        from: AgentState,
        /// New state
        to: AgentState,
    },
    /// Rage hit the maximum
    Enraged,
    /// Rage dropped below the threshold
    Calmed {
        /// Seconds before the hunter can enrage again
        cooldown: f32,
    },
    /// A heard noise is being investigated
    NoiseInvestigated {
        /// Point the hunter walks to
        position: Point3,
    },
    /// The hunter reached the target
    TargetCaptured {
        /// Captured entity
        target: EntityId,
    },
    /// An inconsistent state was detected and reset
    Recovered {
        /// State found inconsistent
        from: AgentState,
        /// State recovered to
        to: AgentState,
    },
}

/// Bounded queue of hunter events.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<HunterEvent>,
    receiver: Receiver<HunterEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventBus {
    /// Creates a new event bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event; dropped when the queue is full.
    pub fn publish(&self, event: HunterEvent) {
        if let Err(TrySendError::Full(event)) = self.sender.try_send(event) {
            debug!(?event, "Event queue full, dropping");
        }
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<HunterEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
