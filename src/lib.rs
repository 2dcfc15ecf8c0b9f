//! Stepspawn: a background step-sensor game service.
//!
//! Turns a stream of physical step-sensor events into game state (step count,
//! spawn countdown) and, on a fixed 1-second cadence, decides whether to
//! raise a time-sensitive "a bug spawns" notification.
//!
//! # Architecture
//!
//! Two independently-clocked producers mutate one shared state object:
//! - **Sensor ingestion**: the platform delivers step events on its own
//!   thread; each valid event increments [`state::GameState`] and broadcasts
//!   the new total.
//! - **Game loop**: a fixed-delay tokio task ticks once per second,
//!   decrementing the spawn countdown and firing the notifier when a
//!   threshold crossing lands while the app is backgrounded.
//!
//! The consumed platform capabilities (sensor feed, notification surface)
//! are traits injected into [`service::GameService`], which owns lifecycle:
//! `start()` wires everything up, `stop()` cancels the loop, releases the
//! sensor registration, and withdraws pending notifications.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod notify;
pub mod scheduler;
pub mod sensor;
pub mod service;
pub mod state;

pub use broadcast::{BROADCAST_ACTION, BroadcastPublisher, STEP_KEY, StepBroadcast, StepPublisher};
pub use config::{GameConfig, NotifyConfig, ServiceConfig};
pub use error::{Result, ServiceError};
pub use notify::{LaunchAction, NotificationBackend, Notifier, SpawnAlert, SpawnNotifier};
pub use scheduler::GameLoop;
pub use sensor::{SensorEvent, SensorEventKind, SensorEventSource, StepHandler, StepSensor};
pub use service::GameService;
pub use state::GameState;
