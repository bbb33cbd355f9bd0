//! Keyboard engine configuration.
//!
//! Settings are injected once at construction. They can be built in code,
//! starting from [`KeyboardConfig::default`], or parsed from TOML:
//!
//! ```
//! use vr_keyboard::KeyboardConfig;
//!
//! let config = KeyboardConfig::from_toml_str(r#"
//! proximity_correction = true
//! display_density = 2.0
//!
//! [timing]
//! long_press_timeout_ms = 400
//! "#).unwrap();
//!
//! assert!(config.proximity_correction);
//! assert_eq!(config.timing.long_press_timeout_ms, 400);
//! assert_eq!(config.timing.repeat_interval_ms, 50);
//! ```

use serde::{Deserialize, Serialize};
use vr_keyboard_core::Millis;
use vr_keyboard_core::logging::targets;

use crate::error::{KeyboardError, Result};

/// Default delay before the first key repeat.
pub const DEFAULT_REPEAT_START_DELAY_MS: Millis = 400;

/// Default interval between key repeats (~20 keys per second).
pub const DEFAULT_REPEAT_INTERVAL_MS: Millis = 50;

/// Default long-press duration.
pub const DEFAULT_LONG_PRESS_TIMEOUT_MS: Millis = 500;

/// Default window in which re-striking a key continues a multi-tap cycle.
pub const DEFAULT_MULTITAP_INTERVAL_MS: Millis = 250;

/// Default debounce time for release on a barely-touched neighbor key.
pub const DEFAULT_DEBOUNCE_MS: Millis = 70;

/// Default delay before a key preview is shown.
pub const DEFAULT_PREVIEW_DELAY_BEFORE_MS: Millis = 0;

/// Default delay before a key preview is hidden.
pub const DEFAULT_PREVIEW_DELAY_AFTER_MS: Millis = 70;

/// Swipe velocity threshold in pixels per second at density 1.0.
pub const BASE_SWIPE_THRESHOLD: f32 = 500.0;

/// Default column count for popup keyboards.
pub const DEFAULT_POPUP_COLUMNS: usize = 6;

/// Timing settings for the timer-driven behaviors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before the first repeat of a held repeatable key.
    pub repeat_start_delay_ms: Millis,
    /// Interval between subsequent repeats.
    pub repeat_interval_ms: Millis,
    /// Hold duration that triggers a long-press.
    pub long_press_timeout_ms: Millis,
    /// Window for multi-tap cycling.
    pub multitap_interval_ms: Millis,
    /// Release debounce threshold.
    pub debounce_ms: Millis,
    /// Delay before the preview bubble appears.
    pub preview_delay_before_ms: Millis,
    /// Delay before the preview bubble disappears.
    pub preview_delay_after_ms: Millis,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            repeat_start_delay_ms: DEFAULT_REPEAT_START_DELAY_MS,
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
            long_press_timeout_ms: DEFAULT_LONG_PRESS_TIMEOUT_MS,
            multitap_interval_ms: DEFAULT_MULTITAP_INTERVAL_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            preview_delay_before_ms: DEFAULT_PREVIEW_DELAY_BEFORE_MS,
            preview_delay_after_ms: DEFAULT_PREVIEW_DELAY_AFTER_MS,
        }
    }
}

/// Preview bubble settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Whether the enlarged key preview is shown at all.
    pub enabled: bool,
    /// Height of the preview bubble in pixels.
    pub height: i32,
    /// Vertical offset of the bubble relative to the key top.
    pub offset: i32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            height: 80,
            offset: 0,
        }
    }
}

/// Popup keyboard settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopupConfig {
    /// Characters per popup row.
    pub columns: usize,
    /// Vertical distance between the pressed key's top and the popup's top.
    pub vertical_offset: i32,
    /// Vertical gap between popup rows.
    pub vertical_gap: i32,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_POPUP_COLUMNS,
            vertical_offset: 0,
            vertical_gap: 0,
        }
    }
}

/// Configuration for a keyboard view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Accept near-miss touches and report adjacent keys as candidates.
    pub proximity_correction: bool,
    /// Display density; scales the swipe velocity threshold.
    pub display_density: f32,
    /// Require a swipe to keep its speed to the end, else commit the down key.
    pub disambiguate_swipe: bool,
    /// Pixels added to touch y before hit-testing.
    pub vertical_correction: i32,
    /// Left padding of the keyboard surface.
    pub padding_left: i32,
    /// Top padding of the keyboard surface.
    pub padding_top: i32,
    /// Timer durations.
    pub timing: TimingConfig,
    /// Preview bubble settings.
    pub preview: PreviewConfig,
    /// Popup keyboard settings.
    pub popup: PopupConfig,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            proximity_correction: false,
            display_density: 1.0,
            disambiguate_swipe: false,
            vertical_correction: 0,
            padding_left: 0,
            padding_top: 0,
            timing: TimingConfig::default(),
            preview: PreviewConfig::default(),
            popup: PopupConfig::default(),
        }
    }
}

impl KeyboardConfig {
    /// Parse and validate a configuration from a TOML document.
    ///
    /// Missing fields take their default values.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|source| KeyboardError::Parse {
            what: "keyboard config",
            source,
        })?;
        config.validate()?;
        tracing::debug!(target: targets::CONFIG, ?config, "loaded keyboard config");
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.display_density.is_finite() && self.display_density > 0.0) {
            return Err(KeyboardError::InvalidConfig {
                field: "display_density",
                message: format!("must be a positive number, got {}", self.display_density),
            });
        }
        if self.timing.repeat_interval_ms == 0 {
            return Err(KeyboardError::InvalidConfig {
                field: "timing.repeat_interval_ms",
                message: "must be non-zero".into(),
            });
        }
        if self.popup.columns == 0 {
            return Err(KeyboardError::InvalidConfig {
                field: "popup.columns",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Swipe velocity threshold in pixels per second.
    pub fn swipe_threshold(&self) -> f32 {
        BASE_SWIPE_THRESHOLD * self.display_density
    }

    /// Configuration for a popup keyboard spawned from a view with this config.
    ///
    /// Popups never show previews and have no padding of their own.
    pub fn for_popup(&self) -> Self {
        Self {
            preview: PreviewConfig {
                enabled: false,
                ..self.preview.clone()
            },
            padding_left: 0,
            padding_top: 0,
            vertical_correction: 0,
            ..self.clone()
        }
    }
}
