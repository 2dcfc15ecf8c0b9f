//! The fixed-delay game loop.
//!
//! One cycle per nominal tick: publish the step count, decrement the spawn
//! countdown, and fire the notifier when a crossing is armed while the app is
//! backgrounded. The loop is cooperative; the suspension between cycles is a
//! `select!` over the cancellation token, so shutdown never waits out a full
//! tick.
//!
//! This is a fixed-delay scheduler, not fixed-rate: a cycle that runs long
//! simply delays the next cycle's start. There are no catch-up ticks.

use crate::broadcast::StepPublisher;
use crate::notify::Notifier;
use crate::state::GameState;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Periodic driver of the game state.
pub struct GameLoop {
    state: Arc<GameState>,
    publisher: Arc<dyn StepPublisher>,
    notifier: Arc<dyn Notifier>,
    tick_interval: Duration,
}

impl GameLoop {
    /// Create a loop over the shared state and side-effect seams.
    pub fn new(
        state: Arc<GameState>,
        publisher: Arc<dyn StepPublisher>,
        notifier: Arc<dyn Notifier>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            state,
            publisher,
            notifier,
            tick_interval,
        }
    }

    /// Spawn the loop as a background task.
    ///
    /// The task runs until `cancel` is triggered; the service awaits the
    /// returned handle during teardown so no cycle outlives `stop()`.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Run cycles until cancelled.
    pub async fn run(self, cancel: CancellationToken) {
        info!(tick = ?self.tick_interval, "game loop started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("game loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(self.tick_interval) => {}
            }

            let started = Instant::now();
            self.cycle();
            let elapsed = started.elapsed();
            if elapsed > self.tick_interval {
                // Observable overrun; the fixed-delay policy absorbs it.
                warn!(?elapsed, tick = ?self.tick_interval, "game loop cycle overran its tick");
            }
        }
    }

    /// One scheduler cycle.
    fn cycle(&self) {
        // Publish unconditionally, even when the total is unchanged;
        // listeners dedupe on their side if they care.
        self.publisher.publish(self.state.steps());

        self.state.decrement_countdown();

        if self.state.consume_spawn_trigger() {
            debug!(countdown = self.state.countdown(), "spawn armed, firing notifier");
            self.notifier.trigger();
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::config::GameConfig;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingPublisher {
        published: Mutex<Vec<u64>>,
    }

    impl StepPublisher for RecordingPublisher {
        fn publish(&self, steps: u64) {
            self.published.lock().unwrap().push(steps);
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        triggers: AtomicUsize,
        clears: AtomicUsize,
    }

    impl Notifier for RecordingNotifier {
        fn trigger(&self) {
            self.triggers.fetch_add(1, Ordering::SeqCst);
        }

        fn clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        state: Arc<GameState>,
        publisher: Arc<RecordingPublisher>,
        notifier: Arc<RecordingNotifier>,
        game_loop: GameLoop,
    }

    fn fixture(countdown_start: u32) -> Fixture {
        let state = Arc::new(GameState::new(&GameConfig {
            tick_interval_ms: 10,
            countdown_start,
            spawn_threshold: 0,
        }));
        let publisher = Arc::new(RecordingPublisher::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let game_loop = GameLoop::new(
            Arc::clone(&state),
            Arc::clone(&publisher) as _,
            Arc::clone(&notifier) as _,
            Duration::from_millis(10),
        );
        Fixture {
            state,
            publisher,
            notifier,
            game_loop,
        }
    }

    #[test]
    fn five_ticks_fire_exactly_one_spawn() {
        let f = fixture(5);
        for _ in 0..5 {
            f.game_loop.cycle();
        }

        assert_eq!(f.state.steps(), 0);
        assert_eq!(f.state.countdown(), 5, "countdown wrapped after crossing");
        assert_eq!(f.notifier.triggers.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn publish_happens_every_cycle_even_unchanged() {
        let f = fixture(10);
        f.game_loop.cycle();
        f.game_loop.cycle();
        f.game_loop.cycle();
        assert_eq!(*f.publisher.published.lock().unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn publish_reflects_steps_accumulated_between_cycles() {
        let f = fixture(10);
        f.game_loop.cycle();
        f.state.increment_steps(4);
        f.game_loop.cycle();
        assert_eq!(*f.publisher.published.lock().unwrap(), vec![0, 4]);
    }

    #[test]
    fn foregrounded_app_suppresses_the_spawn() {
        let f = fixture(5);
        // App comes to the foreground mid-run, before the crossing tick.
        f.game_loop.cycle();
        f.game_loop.cycle();
        f.state.set_app_active(true);
        for _ in 0..3 {
            f.game_loop.cycle();
        }
        assert_eq!(f.notifier.triggers.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn always_active_app_never_triggers() {
        let f = fixture(3);
        f.state.set_app_active(true);
        for _ in 0..20 {
            f.game_loop.cycle();
        }
        assert_eq!(f.notifier.triggers.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn repeated_countdown_cycles_fire_once_each() {
        let f = fixture(3);
        for _ in 0..9 {
            f.game_loop.cycle();
        }
        assert_eq!(f.notifier.triggers.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn loop_stops_promptly_on_cancel() {
        let f = fixture(5);
        let cancel = CancellationToken::new();
        // Long tick so a prompt stop cannot be explained by the tick elapsing.
        let game_loop = GameLoop::new(
            f.state,
            f.publisher as _,
            f.notifier as _,
            Duration::from_secs(60),
        );
        let handle = game_loop.spawn(cancel.clone());

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();

        let joined = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(joined.is_ok(), "loop should stop well before its tick elapses");
    }

    #[tokio::test]
    async fn cancelled_loop_runs_no_further_cycles() {
        let f = fixture(5);
        let cancel = CancellationToken::new();
        let publisher = Arc::clone(&f.publisher);
        let handle = f.game_loop.spawn(cancel.clone());

        cancel.cancel();
        handle.await.expect("join");

        let published = publisher.published.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(publisher.published.lock().unwrap().len(), published);
    }
}
