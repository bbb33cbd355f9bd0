//! Timers owned by a keyboard view.
//!
//! Every timer carries the epoch of the session (or preview) it was scheduled
//! in. Ending a session stops its timers and advances the epoch, so anything
//! that still comes due from an older epoch is dropped when popped.

use vr_keyboard_core::logging::targets;
use vr_keyboard_core::{Millis, TimerError, TimerKind, TimerQueue};

/// What a view timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerAction {
    /// Re-commit the held repeatable key.
    Repeat,
    /// The current key was held past the long-press timeout.
    LongPress,
    /// Show the preview for a key.
    ShowPreview(usize),
    /// Hide the preview bubble.
    RemovePreview,
}

impl TimerAction {
    fn is_session_timer(self) -> bool {
        !matches!(self, TimerAction::RemovePreview)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ViewTimer {
    action: TimerAction,
    epoch: u64,
}

#[derive(Debug, Default)]
pub(crate) struct ViewTimers {
    queue: TimerQueue<ViewTimer>,
    session_epoch: u64,
    preview_epoch: u64,
}

impl ViewTimers {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn epoch_for(&self, action: TimerAction) -> u64 {
        if action.is_session_timer() {
            self.session_epoch
        } else {
            self.preview_epoch
        }
    }

    pub(crate) fn start(&mut self, now: Millis, delay: Millis, action: TimerAction) {
        let epoch = self.epoch_for(action);
        self.queue
            .start_one_shot(now, delay, ViewTimer { action, epoch });
    }

    pub(crate) fn start_repeat(
        &mut self,
        now: Millis,
        first_delay: Millis,
        interval: Millis,
    ) -> Result<(), TimerError> {
        let timer = ViewTimer {
            action: TimerAction::Repeat,
            epoch: self.session_epoch,
        };
        self.queue
            .start_repeating(now, first_delay, interval, timer)
            .map(|_| ())
    }

    /// Stops pending timers of one kind.
    pub(crate) fn cancel(&mut self, matches: impl Fn(TimerAction) -> bool) {
        self.queue.stop_matching(|timer| matches(timer.action));
    }

    /// Stops repeat, long-press and show-preview timers and starts a new epoch.
    pub(crate) fn end_session(&mut self) {
        let stopped = self
            .queue
            .stop_matching(|timer| timer.action.is_session_timer());
        self.session_epoch += 1;
        tracing::trace!(
            target: targets::TIMER,
            stopped,
            epoch = self.session_epoch,
            "session timers cancelled"
        );
    }

    /// Stops every timer, including a pending preview removal.
    pub(crate) fn cancel_all(&mut self) {
        self.queue.clear();
        self.session_epoch += 1;
        self.preview_epoch += 1;
    }

    /// Pops the next timer due at or before `now` from a current epoch.
    pub(crate) fn pop_due(&mut self, now: Millis) -> Option<(Millis, TimerAction)> {
        loop {
            let fired = self.queue.pop_expired(now)?;
            let timer = fired.payload;
            if timer.epoch == self.epoch_for(timer.action) {
                return Some((fired.due, timer.action));
            }
            tracing::trace!(
                target: targets::TIMER,
                action = ?timer.action,
                epoch = timer.epoch,
                "dropping stale timer"
            );
            if fired.kind == TimerKind::Repeating
                && let Err(err) = self.queue.stop(fired.id)
            {
                tracing::warn!(target: targets::TIMER, %err, "could not stop stale timer");
            }
        }
    }

    pub(crate) fn next_deadline(&mut self) -> Option<Millis> {
        self.queue.next_deadline()
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.queue.active_count()
    }
}
