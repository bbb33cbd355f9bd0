//! Error types for the keyboard core.

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimerError {
    /// The timer ID is invalid or the timer has already fired or been stopped.
    #[error("Invalid or expired timer ID")]
    InvalidTimerId,
    /// A repeating timer was requested with a zero interval.
    #[error("Repeating timer interval must be non-zero")]
    ZeroInterval,
}

/// Signal-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("Invalid or disconnected connection ID")]
    InvalidConnection,
}

/// The main error type for core operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Timer-related error.
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),
    /// Signal-related error.
    #[error("Signal error: {0}")]
    Signal(#[from] SignalError),
}

/// A specialized Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
