//! Logging facilities for the VR keyboard.
//!
//! The keyboard uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in the host application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("vr_keyboard=debug")
//!     .init();
//! ```
//!
//! The library never installs a subscriber itself.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "vr_keyboard_core";
    /// Timer queue target.
    pub const TIMER: &str = "vr_keyboard_core::timer";
    /// Signal/slot target.
    pub const SIGNAL: &str = "vr_keyboard_core::signal";
    /// Layout model target.
    pub const LAYOUT: &str = "vr_keyboard::layout";
    /// Touch/hover state machine target.
    pub const VIEW: &str = "vr_keyboard::view";
    /// Gesture classification target.
    pub const GESTURE: &str = "vr_keyboard::gesture";
    /// Popup keyboard target.
    pub const POPUP: &str = "vr_keyboard::popup";
    /// Configuration target.
    pub const CONFIG: &str = "vr_keyboard::config";
}

/// A lightweight span guard for timing a keyboard operation at `trace` level.
///
/// ```ignore
/// let _span = PerfSpan::new("hit_test");
/// // ... work ...
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enter a new performance span with the given operation name.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::trace_span!(target: "vr_keyboard::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

impl std::fmt::Debug for PerfSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerfSpan").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_without_subscriber() {
        let span = PerfSpan::new("test_operation");
        assert!(format!("{span:?}").starts_with("PerfSpan"));
    }
}
