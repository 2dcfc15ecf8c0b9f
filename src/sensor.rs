//! Step-sensor event ingestion.
//!
//! The platform delivers step-detected events on its own thread, at a rate
//! this service does not control. [`SensorEventSource`] bridges that feed to
//! the shared [`GameState`]: each valid event increments the step total and
//! forwards the new count to the broadcast publisher. The handler does the
//! minimum possible work because the platform may call it very frequently.

use crate::broadcast::StepPublisher;
use crate::error::Result;
use crate::state::GameState;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Kind of event delivered by the sensor capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorEventKind {
    /// A footstep was detected.
    StepDetector,
    /// Any other sensor signal; ignored by this service.
    Other,
}

/// A discrete event from the platform's sensor subsystem.
#[derive(Debug, Clone)]
pub struct SensorEvent {
    /// What the sensor detected.
    pub kind: SensorEventKind,
    /// Steps since the previous event; `None` for an empty payload.
    pub magnitude: Option<u32>,
    /// When the platform timestamped the event.
    pub detected_at: Instant,
}

impl SensorEvent {
    /// A step event with the given magnitude, timestamped now.
    pub fn steps(magnitude: u32) -> Self {
        Self {
            kind: SensorEventKind::StepDetector,
            magnitude: Some(magnitude),
            detected_at: Instant::now(),
        }
    }
}

/// Callback invoked by the sensor capability for each event.
///
/// Must return quickly; the delivery thread belongs to the platform.
pub type StepHandler = Box<dyn Fn(SensorEvent) + Send + Sync>;

/// The consumed sensor capability.
///
/// Implementations wrap whatever the host platform offers. Both operations
/// are expected to be idempotent at the capability level; the service layers
/// its own registered-flag on top so double registration never happens.
pub trait StepSensor: Send + Sync {
    /// Start delivering events to `handler`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host has no step sensor; the service then
    /// runs degraded (the step count simply never increments).
    fn subscribe(&self, handler: StepHandler) -> Result<()>;

    /// Stop delivering events. Must tolerate not being subscribed.
    fn unsubscribe(&self);
}

/// Wires the sensor capability to game state and the step broadcast.
pub struct SensorEventSource {
    sensor: Arc<dyn StepSensor>,
    state: Arc<GameState>,
    publisher: Arc<dyn StepPublisher>,
    registered: Arc<AtomicBool>,
}

impl SensorEventSource {
    /// Create an unregistered source over the given capability.
    pub fn new(
        sensor: Arc<dyn StepSensor>,
        state: Arc<GameState>,
        publisher: Arc<dyn StepPublisher>,
    ) -> Self {
        Self {
            sensor,
            state,
            publisher,
            registered: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register with the sensor capability. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns the capability's error when subscription fails; the source is
    /// left unregistered.
    pub fn register(&self) -> Result<()> {
        if self.registered.swap(true, Ordering::SeqCst) {
            debug!("sensor source already registered, skipping");
            return Ok(());
        }

        let state = Arc::clone(&self.state);
        let publisher = Arc::clone(&self.publisher);
        let registered = Arc::clone(&self.registered);
        let handler: StepHandler = Box::new(move |event| {
            // A callback already in flight when we deregister is dropped here
            // rather than racing teardown.
            if !registered.load(Ordering::SeqCst) {
                trace!("dropping sensor event after deregistration");
                return;
            }
            let Some(magnitude) = valid_step_magnitude(&event) else {
                return;
            };
            let total = state.increment_steps(magnitude);
            trace!(magnitude, total, "step detected");
            publisher.publish(total);
        });

        if let Err(e) = self.sensor.subscribe(handler) {
            self.registered.store(false, Ordering::SeqCst);
            return Err(e);
        }
        info!("sensor source registered");
        Ok(())
    }

    /// Deregister from the sensor capability. Idempotent; deregistering an
    /// unregistered source is a no-op.
    pub fn deregister(&self) {
        if !self.registered.swap(false, Ordering::SeqCst) {
            return;
        }
        self.sensor.unsubscribe();
        info!("sensor source deregistered");
    }

    /// Whether the source is currently registered.
    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::SeqCst)
    }
}

/// Extract the step magnitude from an event, dropping malformed ones.
///
/// Empty payloads, zero magnitudes, and non-step events are transient sensor
/// noise: logged and ignored, never a state mutation.
fn valid_step_magnitude(event: &SensorEvent) -> Option<u32> {
    if event.kind != SensorEventKind::StepDetector {
        trace!(kind = ?event.kind, "ignoring non-step sensor event");
        return None;
    }
    match event.magnitude {
        Some(magnitude) if magnitude > 0 => Some(magnitude),
        Some(_) => {
            trace!("ignoring zero-magnitude step event");
            None
        }
        None => {
            warn!("dropping step event with empty payload");
            None
        }
    }
}
