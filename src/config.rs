//! Configuration types for the step service.

use crate::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration for the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Game loop and countdown settings.
    pub game: GameConfig,
    /// Spawn notification settings.
    pub notification: NotifyConfig,
}

/// Game loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Nominal interval between scheduler cycles, in milliseconds.
    pub tick_interval_ms: u64,
    /// Value the countdown starts from (and wraps back to).
    pub countdown_start: u32,
    /// Countdown value at which a spawn is armed.
    ///
    /// Must be below `countdown_start`; the countdown wraps after crossing it.
    pub spawn_threshold: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            countdown_start: 60,
            spawn_threshold: 0,
        }
    }
}

impl GameConfig {
    /// Tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Spawn notification content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Alert title.
    pub title: String,
    /// Alert body text.
    pub body: String,
    /// Opaque launch target activated when the user taps the alert.
    pub launch_target: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            title: "Night has fallen".to_owned(),
            body: "A bug is spawning. Get back in and fight!".to_owned(),
            launch_target: "stepspawn://play".to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&contents)
            .map_err(|e| ServiceError::Config(format!("cannot parse {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServiceConfig::default();
        assert_eq!(config.game.tick_interval_ms, 1_000);
        assert_eq!(config.game.tick_interval(), Duration::from_secs(1));
        assert!(config.game.spawn_threshold < config.game.countdown_start);
        assert!(!config.notification.title.is_empty());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: ServiceConfig = toml::from_str(
            r#"
            [game]
            countdown_start = 5
            spawn_threshold = 0
            "#,
        )
        .expect("parse");
        assert_eq!(config.game.countdown_start, 5);
        assert_eq!(config.game.tick_interval_ms, 1_000);
        assert_eq!(config.notification.launch_target, "stepspawn://play");
    }

    #[test]
    fn load_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("stepspawn.toml");

        let mut config = ServiceConfig::default();
        config.game.tick_interval_ms = 250;
        config.notification.title = "custom".to_owned();
        std::fs::write(&path, toml::to_string(&config).expect("serialize")).expect("write");

        let loaded = ServiceConfig::load(&path).expect("load");
        assert_eq!(loaded.game.tick_interval_ms, 250);
        assert_eq!(loaded.notification.title, "custom");
    }

    #[test]
    fn load_missing_file_is_a_config_error() {
        let err = ServiceConfig::load(Path::new("/nonexistent/stepspawn.toml")).unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }
}
