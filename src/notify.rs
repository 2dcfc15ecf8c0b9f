//! Spawn notification side effects.
//!
//! The game loop fires through the [`Notifier`] seam; [`SpawnNotifier`] is
//! the production implementation over whatever notification capability the
//! host provides. Backend failures are absorbed and logged so a broken
//! notification surface never takes the scheduler down with it.

use crate::config::NotifyConfig;
use crate::error::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Opaque handle that, when activated from the notification, brings the
/// consuming application to the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAction(pub String);

/// A single user-visible spawn alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnAlert {
    /// Alert title.
    pub title: String,
    /// Alert body text.
    pub body: String,
    /// Launch action attached to the alert.
    pub launch: LaunchAction,
}

/// The consumed notification capability.
pub trait NotificationBackend: Send + Sync {
    /// Display one alert.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot display the alert.
    fn show(&self, alert: &SpawnAlert) -> Result<()>;

    /// Withdraw every outstanding alert.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot withdraw alerts.
    fn withdraw_all(&self) -> Result<()>;
}

/// Seam the game loop triggers spawns through; independently mockable.
pub trait Notifier: Send + Sync {
    /// Raise one spawn alert. Each call is an independent side effect; the
    /// scheduler's edge-triggered gating is what prevents a flood.
    fn trigger(&self);

    /// Withdraw any outstanding alert. Called on shutdown.
    fn clear(&self);
}

/// Builds spawn alerts from config and hands them to the backend.
pub struct SpawnNotifier {
    backend: Arc<dyn NotificationBackend>,
    config: NotifyConfig,
}

impl SpawnNotifier {
    /// Create a notifier over the given backend.
    pub fn new(backend: Arc<dyn NotificationBackend>, config: NotifyConfig) -> Self {
        Self { backend, config }
    }
}

impl Notifier for SpawnNotifier {
    fn trigger(&self) {
        info!("a bug is spawning, raising notification");
        let alert = SpawnAlert {
            title: self.config.title.clone(),
            body: self.config.body.clone(),
            launch: LaunchAction(self.config.launch_target.clone()),
        };
        if let Err(e) = self.backend.show(&alert) {
            warn!("cannot show spawn notification: {e}");
        }
    }

    fn clear(&self) {
        if let Err(e) = self.backend.withdraw_all() {
            warn!("cannot withdraw notifications: {e}");
        }
    }
}
