//! Shared game state mutated by the sensor path and the game loop.
//!
//! [`GameState`] is the only shared mutable resource in the service. Both
//! producers (sensor callbacks on the platform's delivery thread, the game
//! loop on the tokio runtime) funnel through the mutex here, so every
//! operation is atomic with respect to every other and no caller ever holds
//! a private copy of a field.

use crate::config::GameConfig;
use std::sync::Mutex;
use tracing::debug;

/// Fields guarded by the state mutex.
#[derive(Debug)]
struct Inner {
    step_count: u64,
    countdown: u32,
    can_notify: bool,
    app_active: bool,
}

/// The single source of truth for step count, spawn countdown, and the
/// notification-eligibility and app-visibility flags.
///
/// Constructed once per service and shared as `Arc<GameState>`; components
/// receive it at construction time rather than through any global lookup.
#[derive(Debug)]
pub struct GameState {
    inner: Mutex<Inner>,
    countdown_start: u32,
    spawn_threshold: u32,
}

impl GameState {
    /// Create state with the countdown primed to `countdown_start`.
    pub fn new(config: &GameConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                step_count: 0,
                countdown: config.countdown_start,
                can_notify: false,
                app_active: false,
            }),
            countdown_start: config.countdown_start,
            spawn_threshold: config.spawn_threshold,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock means a panic inside one of these short critical
        // sections; the state itself is still a valid snapshot.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add `n` detected steps and return the new total.
    ///
    /// Callers validate the event first; `n` is expected to be positive.
    pub fn increment_steps(&self, n: u32) -> u64 {
        let mut inner = self.lock();
        inner.step_count += u64::from(n);
        inner.step_count
    }

    /// Decrement the countdown by one tick.
    ///
    /// Crossing the spawn threshold arms `can_notify` and wraps the countdown
    /// back to its starting value; the countdown is a repeating cycle, not a
    /// one-shot timer.
    pub fn decrement_countdown(&self) {
        let mut inner = self.lock();
        inner.countdown = inner.countdown.saturating_sub(1);
        if inner.countdown <= self.spawn_threshold {
            debug!(countdown = inner.countdown, "spawn countdown crossed threshold");
            inner.can_notify = true;
            inner.countdown = self.countdown_start;
        }
    }

    /// Consume the pending spawn crossing, if any.
    ///
    /// Reads `can_notify` and `app_active` under the same critical section so
    /// the caller acts on a consistent pair, then clears the flag. Returns
    /// `true` when the notifier must fire (armed and app not in foreground).
    /// A crossing that lands while the app is foregrounded is consumed
    /// without firing; the next crossing re-arms it (edge-triggered).
    pub fn consume_spawn_trigger(&self) -> bool {
        let mut inner = self.lock();
        if !inner.can_notify {
            return false;
        }
        inner.can_notify = false;
        !inner.app_active
    }

    /// Current step total.
    pub fn steps(&self) -> u64 {
        self.lock().step_count
    }

    /// Current countdown value.
    pub fn countdown(&self) -> u32 {
        self.lock().countdown
    }

    /// Whether a spawn crossing is armed and not yet consumed.
    pub fn can_notify(&self) -> bool {
        self.lock().can_notify
    }

    /// Whether the consuming UI is currently in the foreground.
    pub fn app_active(&self) -> bool {
        self.lock().app_active
    }

    /// Record a foreground/background transition of the consuming UI.
    pub fn set_app_active(&self, active: bool) {
        debug!(active, "app visibility changed");
        self.lock().app_active = active;
    }
}
