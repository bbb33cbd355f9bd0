//! Multi-tap resolution.

use vr_keyboard_core::Millis;
use vr_keyboard_core::logging::targets;

use crate::layout::{Layout, codes};

/// Tracks repeated taps on one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiTapState {
    last_sent: Option<usize>,
    last_tap_time: Option<Millis>,
    /// `None` marks the first tap of a cycle.
    tap_count: Option<usize>,
    in_multi_tap: bool,
    interval: Millis,
}

impl MultiTapState {
    /// Creates a resolver with the given re-strike window.
    pub fn new(interval: Millis) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    /// Forgets the current cycle.
    pub fn reset(&mut self) {
        self.last_sent = None;
        self.last_tap_time = None;
        self.tap_count = None;
        self.in_multi_tap = false;
    }

    /// Whether a cycle is in progress.
    pub fn in_multi_tap(&self) -> bool {
        self.in_multi_tap
    }

    /// Index into the key's codes of the current cycle position, if past the first tap.
    pub fn tap_count(&self) -> Option<usize> {
        self.tap_count
    }

    /// The key that was last committed.
    pub fn last_sent(&self) -> Option<usize> {
        self.last_sent
    }

    fn within_window(&self, key: usize, time: Millis) -> bool {
        self.last_sent == Some(key)
            && self
                .last_tap_time
                .is_some_and(|last| time < last + self.interval)
    }

    /// Updates the cycle when `key` is struck at `time`.
    pub fn on_key_struck(&mut self, layout: &Layout, key: Option<usize>, time: Millis) {
        let Some((index, key)) = key.and_then(|i| layout.key(i).map(|k| (i, k))) else {
            return;
        };

        if key.is_multi_tap() {
            self.in_multi_tap = true;
            self.tap_count = if self.within_window(index, time) {
                Some(self.tap_count.map_or(0, |count| (count + 1) % key.codes.len()))
            } else {
                None
            };
            tracing::trace!(target: targets::VIEW, index, tap_count = ?self.tap_count, "multi-tap");
            return;
        }

        if key.primary_code() == codes::SHIFT && self.within_window(index, time) {
            self.in_multi_tap = true;
        }

        let expired = self.last_tap_time.is_none_or(|last| time > last + self.interval);
        if expired || self.last_sent != Some(index) {
            self.reset();
        }
    }

    /// Resolves the code to commit for `key`.
    ///
    /// Returns the code and whether the previously committed character must
    /// be retracted first.
    pub fn resolve(&mut self, key_codes: &[i32]) -> (i32, bool) {
        let primary = key_codes.first().copied().unwrap_or(0);
        if !self.in_multi_tap {
            return (primary, false);
        }
        match self.tap_count {
            Some(count) => {
                let code = key_codes
                    .get(count.min(key_codes.len().saturating_sub(1)))
                    .copied()
                    .unwrap_or(primary);
                (code, primary != codes::SHIFT)
            }
            None => {
                self.tap_count = Some(0);
                (primary, false)
            }
        }
    }

    /// Records a commit of `key` at `time`.
    pub fn record_sent(&mut self, key: usize, time: Millis) {
        self.last_sent = Some(key);
        self.last_tap_time = Some(time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Key, LayoutBuilder};

    fn layout() -> Layout {
        LayoutBuilder::new()
            .key_size(40, 40)
            .row([
                Key::new(['a' as i32, 'b' as i32, 'c' as i32]),
                Key::char('x'),
                Key::new([codes::SHIFT]),
            ])
            .build()
            .unwrap()
    }

    fn tap(state: &mut MultiTapState, layout: &Layout, key: usize, time: Millis) -> (i32, bool) {
        state.on_key_struck(layout, Some(key), time);
        let resolved = state.resolve(&layout.keys()[key].codes);
        state.record_sent(key, time);
        resolved
    }

    #[test]
    fn test_rapid_taps_cycle() {
        let layout = layout();
        let mut state = MultiTapState::new(250);
        assert_eq!(tap(&mut state, &layout, 0, 0), ('a' as i32, false));
        assert_eq!(tap(&mut state, &layout, 0, 200), ('b' as i32, true));
        assert_eq!(tap(&mut state, &layout, 0, 400), ('c' as i32, true));
        assert_eq!(tap(&mut state, &layout, 0, 600), ('a' as i32, true));
    }

    #[test]
    fn test_slow_tap_restarts_cycle() {
        let layout = layout();
        let mut state = MultiTapState::new(250);
        tap(&mut state, &layout, 0, 0);
        assert_eq!(tap(&mut state, &layout, 0, 250), ('a' as i32, false));
    }

    #[test]
    fn test_other_key_resets() {
        let layout = layout();
        let mut state = MultiTapState::new(250);
        tap(&mut state, &layout, 0, 0);
        assert_eq!(tap(&mut state, &layout, 1, 100), ('x' as i32, false));
        assert!(!state.in_multi_tap());
        assert_eq!(tap(&mut state, &layout, 0, 150), ('a' as i32, false));
    }

    #[test]
    fn test_shift_double_tap_never_retracts() {
        let layout = layout();
        let mut state = MultiTapState::new(250);
        assert_eq!(tap(&mut state, &layout, 2, 0), (codes::SHIFT, false));
        assert!(!state.in_multi_tap());

        assert_eq!(tap(&mut state, &layout, 2, 100), (codes::SHIFT, false));
        assert!(state.in_multi_tap());
        assert_eq!(tap(&mut state, &layout, 2, 200), (codes::SHIFT, false));
    }

    #[test]
    fn test_no_key_is_ignored() {
        let layout = layout();
        let mut state = MultiTapState::new(250);
        tap(&mut state, &layout, 0, 0);
        state.on_key_struck(&layout, None, 10);
        state.on_key_struck(&layout, Some(99), 10);
        assert!(state.in_multi_tap());
        assert_eq!(state.last_sent(), Some(0));
    }
}
