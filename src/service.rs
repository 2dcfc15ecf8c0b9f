//! Service lifecycle orchestration.
//!
//! [`GameService`] owns construction and teardown of every component: it
//! wires the sensor capability into [`GameState`], runs the game loop, and
//! guarantees that `stop()` releases the sensor registration, halts the loop,
//! and withdraws any pending notification. `stop()` is idempotent; `start()`
//! while running is rejected so a second loop can never leak.

use crate::broadcast::{BroadcastPublisher, StepBroadcast, StepPublisher};
use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::notify::{NotificationBackend, Notifier, SpawnNotifier};
use crate::scheduler::GameLoop;
use crate::sensor::{SensorEventSource, StepSensor};
use crate::state::GameState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long `stop()` waits for an in-flight cycle to drain before aborting
/// the loop task outright.
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Handle to the running game loop.
struct RunningLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// The background step-sensor game service.
pub struct GameService {
    config: ServiceConfig,
    state: Arc<GameState>,
    publisher: BroadcastPublisher,
    notifier: Arc<dyn Notifier>,
    sensor_source: SensorEventSource,
    running: Option<RunningLoop>,
}

impl GameService {
    /// Construct the service over the host's sensor and notification
    /// capabilities. State starts fresh; the step count is reset only here,
    /// never across `stop()`/`start()` on the same service value.
    pub fn new(
        config: ServiceConfig,
        sensor: Arc<dyn StepSensor>,
        notification_backend: Arc<dyn NotificationBackend>,
    ) -> Self {
        let state = Arc::new(GameState::new(&config.game));
        let publisher = BroadcastPublisher::new();
        let notifier: Arc<dyn Notifier> = Arc::new(SpawnNotifier::new(
            notification_backend,
            config.notification.clone(),
        ));
        let sensor_source = SensorEventSource::new(
            sensor,
            Arc::clone(&state),
            Arc::new(publisher.clone()) as Arc<dyn StepPublisher>,
        );
        Self {
            config,
            state,
            publisher,
            notifier,
            sensor_source,
            running: None,
        }
    }

    /// Register the sensor and start the game loop.
    ///
    /// A missing sensor capability degrades the service (the loop still runs,
    /// steps just never increment) instead of failing startup.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::AlreadyRunning`] if called while running.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(ServiceError::AlreadyRunning);
        }

        if let Err(e) = self.sensor_source.register() {
            warn!("starting without step sensor: {e}");
        }

        let cancel = CancellationToken::new();
        let game_loop = GameLoop::new(
            Arc::clone(&self.state),
            Arc::new(self.publisher.clone()) as Arc<dyn StepPublisher>,
            Arc::clone(&self.notifier),
            self.config.game.tick_interval(),
        );
        let handle = game_loop.spawn(cancel.clone());
        self.running = Some(RunningLoop { cancel, handle });

        info!("game service started");
        Ok(())
    }

    /// Stop the game loop, release the sensor registration, and withdraw any
    /// pending notification. Idempotent; calling it twice is the same as
    /// calling it once.
    pub async fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            let abort = running.handle.abort_handle();
            match tokio::time::timeout(STOP_GRACE, running.handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("game loop task failed during shutdown: {e}"),
                Err(_) => {
                    // Drain window elapsed; the loop is stuck inside a cycle.
                    warn!("game loop did not stop within {STOP_GRACE:?}, aborting");
                    abort.abort();
                }
            }
            info!("game service stopped");
        }

        self.sensor_source.deregister();
        self.notifier.clear();
    }

    /// Whether the game loop is currently running.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Current step total.
    pub fn steps(&self) -> u64 {
        self.state.steps()
    }

    /// Record a foreground/background transition of the consuming UI.
    pub fn set_app_active(&self, active: bool) {
        self.state.set_app_active(active);
    }

    /// Subscribe to step-count broadcasts.
    pub fn subscribe_steps(&self) -> broadcast::Receiver<StepBroadcast> {
        self.publisher.subscribe()
    }

    /// Shared game state, for callers that need direct reads.
    pub fn state(&self) -> &Arc<GameState> {
        &self.state
    }
}
