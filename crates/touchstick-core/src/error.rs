//! Error types.

use thiserror::Error;

/// Errors raised while building a joystick configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Joystick shape is required")]
    MissingShape,
    #[error("Joystick length is required")]
    MissingLength,
    #[error("Joystick length must be finite and positive, got {0}")]
    InvalidLength(f64),
    #[error("Handle size must be finite and positive, got {width}x{height}")]
    InvalidHandleSize { width: f64, height: f64 },
    #[error("Neutral point must be finite")]
    InvalidNeutralPoint,
    #[error("Sticky target ({x}, {y}) lies outside the joystick track")]
    StickyOutOfBounds { x: f64, y: f64 },
    #[error("Invalid configuration JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
