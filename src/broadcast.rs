//! Step-count fan-out to external listeners.
//!
//! Delivery is fire-and-forget: a publish with no listeners is not an error,
//! and a listener that falls behind loses old values rather than exerting
//! backpressure on the sensor or game loop paths.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// Action name carried by every step broadcast.
pub const BROADCAST_ACTION: &str = "stepspawn.STEP_COUNT";

/// Payload key under which the step total is published.
pub const STEP_KEY: &str = "stepspawn.STEP_KEY";

/// Number of unconsumed broadcasts a slow listener may lag behind by.
const BROADCAST_CAPACITY: usize = 64;

/// A step-count update as seen by external listeners.
///
/// Serializes to JSON for listeners outside the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBroadcast {
    /// Action name, always [`BROADCAST_ACTION`].
    pub action: String,
    /// Payload key, always [`STEP_KEY`].
    pub key: String,
    /// Current step total.
    pub steps: u64,
}

impl StepBroadcast {
    /// Build the payload for a step total.
    pub fn new(steps: u64) -> Self {
        Self {
            action: BROADCAST_ACTION.to_owned(),
            key: STEP_KEY.to_owned(),
            steps,
        }
    }
}

/// Seam the sensor source and game loop publish through.
pub trait StepPublisher: Send + Sync {
    /// Fan out the current step total. Best-effort, never blocks.
    fn publish(&self, steps: u64);
}

/// Fan-out over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<StepBroadcast>,
}

impl BroadcastPublisher {
    /// Create a publisher with the default listener capacity.
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        Self { tx }
    }

    /// Obtain a receiver for step updates.
    pub fn subscribe(&self) -> broadcast::Receiver<StepBroadcast> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StepPublisher for BroadcastPublisher {
    fn publish(&self, steps: u64) {
        trace!(steps, "broadcasting step count");
        // Err means no listeners are subscribed right now; that is fine.
        let _ = self.tx.send(StepBroadcast::new(steps));
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn publish_without_listeners_is_a_no_op() {
        let publisher = BroadcastPublisher::new();
        publisher.publish(7);
    }

    #[tokio::test]
    async fn listeners_receive_published_totals() {
        let publisher = BroadcastPublisher::new();
        let mut rx = publisher.subscribe();

        publisher.publish(1);
        publisher.publish(2);

        assert_eq!(rx.recv().await.expect("first").steps, 1);
        let second = rx.recv().await.expect("second");
        assert_eq!(second.steps, 2);
        assert_eq!(second.action, BROADCAST_ACTION);
        assert_eq!(second.key, STEP_KEY);
    }

    #[test]
    fn payload_serializes_for_external_listeners() {
        let json = serde_json::to_string(&StepBroadcast::new(42)).expect("serialize");
        let restored: StepBroadcast = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, StepBroadcast::new(42));
        assert!(json.contains("stepspawn.STEP_KEY"));
    }
}
