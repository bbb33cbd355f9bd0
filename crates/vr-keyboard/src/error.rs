//! Error types for the keyboard engine.

use vr_keyboard_core::TimerError;

/// Errors that can occur while building or configuring a keyboard.
#[derive(Debug, thiserror::Error)]
pub enum KeyboardError {
    /// A key was declared without any character codes.
    #[error("Key {index} in row {row} has no codes and no label to derive one from")]
    EmptyCodes { row: usize, index: usize },

    /// A layout or config description could not be parsed.
    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: toml::de::Error,
    },

    /// A geometry recomputation could not be applied.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A configuration value is out of range.
    #[error("Invalid value for config field '{field}': {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    /// Timer scheduling failed.
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),
}

/// A specialized Result type for keyboard operations.
pub type Result<T> = std::result::Result<T, KeyboardError>;
