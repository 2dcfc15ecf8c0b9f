//! Error types for the step service.

/// Top-level error type for the step-sensor game service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Sensor capability unavailable or subscription failure.
    #[error("sensor error: {0}")]
    Sensor(String),

    /// Notification backend error.
    #[error("notification error: {0}")]
    Notification(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Game loop scheduling error.
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// `start()` was called while the service is already running.
    #[error("service is already running")]
    AlreadyRunning,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServiceError>;
