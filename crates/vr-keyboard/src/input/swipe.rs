//! Swipe recognition.
//!
//! [`SwipeTracker`] keeps the last few pointer samples of a session and
//! estimates velocity from them. [`SwipeClassifier`] turns the estimate and
//! the travelled distance into a discrete [`SwipeDirection`].

use std::collections::VecDeque;

use vr_keyboard_core::Millis;
use vr_keyboard_core::logging::targets;

use crate::action::SwipeDirection;

/// Number of samples kept by the tracker.
pub const SWIPE_SAMPLES: usize = 4;

/// Samples older than this, relative to the newest, are discarded.
pub const SWIPE_WINDOW_MS: Millis = 200;

/// A swipe whose ending velocity falls below this fraction of its peak is
/// treated as a key press when disambiguation is enabled.
pub const SWIPE_DECAY_RATIO: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    x: f32,
    y: f32,
    time: Millis,
}

/// A short history of pointer positions.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    samples: VecDeque<Sample>,
}

impl SwipeTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(SWIPE_SAMPLES),
        }
    }

    /// Forgets all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Records a position.
    pub fn add_point(&mut self, x: f32, y: f32, time: Millis) {
        let horizon = time.saturating_sub(SWIPE_WINDOW_MS);
        while self.samples.front().is_some_and(|s| s.time < horizon) {
            self.samples.pop_front();
        }
        if self.samples.len() == SWIPE_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(Sample { x, y, time });
    }

    /// Estimates the current velocity in pixels per second.
    ///
    /// Each sample's average velocity since the oldest sample is folded into a
    /// running mean that weights later samples more heavily.
    pub fn velocity(&self) -> (f32, f32) {
        let Some(oldest) = self.samples.front() else {
            return (0.0, 0.0);
        };

        let mut accum_x = 0.0f32;
        let mut accum_y = 0.0f32;
        for sample in self.samples.iter().skip(1) {
            let duration = sample.time.saturating_sub(oldest.time);
            if duration == 0 {
                continue;
            }
            let duration = duration as f32;
            let vel_x = (sample.x - oldest.x) / duration * 1000.0;
            let vel_y = (sample.y - oldest.y) / duration * 1000.0;
            accum_x = if accum_x == 0.0 {
                vel_x
            } else {
                (accum_x + vel_x) * 0.5
            };
            accum_y = if accum_y == 0.0 {
                vel_y
            } else {
                (accum_y + vel_y) * 0.5
            };
        }
        (accum_x, accum_y)
    }
}

/// The outcome of classifying the motion so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Not a swipe.
    None,
    /// A swipe in the given direction.
    Swipe(SwipeDirection),
    /// A fling that lost its speed; commit the key under the down point.
    SendDownKey,
}

/// Classifies a pointer session as a swipe.
#[derive(Debug, Clone)]
pub struct SwipeClassifier {
    tracker: SwipeTracker,
    threshold: f32,
    disambiguate: bool,
    start: (f32, f32),
    peak: (f32, f32),
    possible_poly: bool,
}

impl SwipeClassifier {
    /// Creates a classifier with a velocity threshold in pixels per second.
    pub fn new(threshold: f32, disambiguate: bool) -> Self {
        Self {
            tracker: SwipeTracker::new(),
            threshold,
            disambiguate,
            start: (0.0, 0.0),
            peak: (0.0, 0.0),
            possible_poly: false,
        }
    }

    /// Starts a new session at the down point.
    pub fn begin(&mut self, x: f32, y: f32, time: Millis) {
        self.tracker.clear();
        self.start = (x, y);
        self.peak = (0.0, 0.0);
        self.tracker.add_point(x, y, time);
    }

    /// Records a sample and updates the peak velocity.
    pub fn add_point(&mut self, x: f32, y: f32, time: Millis) {
        self.tracker.add_point(x, y, time);
        let (vx, vy) = self.tracker.velocity();
        if vx * vx + vy * vy > self.peak.0 * self.peak.0 + self.peak.1 * self.peak.1 {
            self.peak = (vx, vy);
        }
    }

    /// Marks the session as a product of pointer-count normalization.
    pub fn set_possible_poly(&mut self, possible_poly: bool) {
        self.possible_poly = possible_poly;
    }

    /// Enables or disables the decayed-fling fallback.
    pub fn set_disambiguate(&mut self, disambiguate: bool) {
        self.disambiguate = disambiguate;
    }

    /// The underlying tracker.
    pub fn tracker(&self) -> &SwipeTracker {
        &self.tracker
    }

    /// Classifies the motion from the down point to `(x, y)` on a surface
    /// of the given size.
    pub fn classify(&self, x: f32, y: f32, width: i32, height: i32) -> SwipeOutcome {
        if self.possible_poly {
            return SwipeOutcome::None;
        }

        let (velocity_x, velocity_y) = self.peak;
        let (ending_x, ending_y) = self.tracker.velocity();
        let abs_x = velocity_x.abs();
        let abs_y = velocity_y.abs();
        let delta_x = x - self.start.0;
        let delta_y = y - self.start.1;
        let travel_x = (width / 2) as f32;
        let travel_y = (height / 2) as f32;
        let threshold = self.threshold;

        let candidate = if velocity_x > threshold && abs_y < abs_x && delta_x > travel_x {
            Some((SwipeDirection::Right, ending_x < velocity_x * SWIPE_DECAY_RATIO))
        } else if velocity_x < -threshold && abs_y < abs_x && delta_x < -travel_x {
            Some((SwipeDirection::Left, ending_x > velocity_x * SWIPE_DECAY_RATIO))
        } else if velocity_y < -threshold && abs_x < abs_y && delta_y < -travel_y {
            Some((SwipeDirection::Up, ending_y > velocity_y * SWIPE_DECAY_RATIO))
        } else if velocity_y > threshold && abs_x < abs_y / 2.0 && delta_y > travel_y {
            Some((SwipeDirection::Down, ending_y < velocity_y * SWIPE_DECAY_RATIO))
        } else {
            None
        };

        match candidate {
            Some((_, true)) if self.disambiguate => {
                tracing::trace!(target: targets::GESTURE, "fling decayed, sending down key");
                SwipeOutcome::SendDownKey
            }
            Some((direction, _)) => {
                tracing::debug!(target: targets::GESTURE, ?direction, "swipe recognized");
                SwipeOutcome::Swipe(direction)
            }
            None => SwipeOutcome::None,
        }
    }
}
