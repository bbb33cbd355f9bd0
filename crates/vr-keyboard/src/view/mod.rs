//! The touch/hover state machine of one keyboard surface.
//!
//! A [`KeyboardView`] owns a layout and everything transient about the
//! pointer session on it: the current and previous keys, the multi-tap
//! cycle, the swipe tracker, per-device hover and the view's timers.
//!
//! The view is driven entirely by the host: pointer and hover events carry
//! logical timestamps, and [`KeyboardView::tick`] advances the clock between
//! events. Timers due at or before an event's time fire before the event is
//! processed. Output accumulates in the view and is collected with
//! [`KeyboardView::take_actions`] and [`KeyboardView::take_requests`].

mod preview;
mod timers;

use vr_keyboard_core::logging::targets;
use vr_keyboard_core::{HoverAction, HoverEvent, Millis, PointerAction, PointerEvent};

use crate::action::KeyboardAction;
use crate::config::KeyboardConfig;
use crate::error::Result;
use crate::input::{HoverTracker, MultiTapState, SwipeClassifier, SwipeOutcome};
use crate::layout::{Layout, NOT_A_KEY};
use crate::surface::{SurfaceLayer, SurfaceRequest, SurfaceRequestKind};

pub use preview::PreviewBubble;

use preview::PreviewState;
use timers::{TimerAction, ViewTimers};

/// Phase of the primary pointer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TouchState {
    /// No pointer down.
    #[default]
    Idle,
    /// Pointer down, not moved yet.
    Down,
    /// Pointer moving.
    Moving,
    /// Session abandoned; motion is ignored until the next down.
    Aborted,
}

/// Keys and timings of the primary pointer session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerSession {
    /// Key under the initial down. This is the key a release commits.
    pub down_key: Option<usize>,
    /// Key the session is tracking for long-press and debounce.
    pub current_key: Option<usize>,
    /// Key the pointer left most recently.
    pub last_key: Option<usize>,
    /// Time of the down.
    pub down_time: Millis,
    /// Time spent on the current key.
    pub current_key_time: Millis,
    /// Time spent on the last key.
    pub last_key_time: Millis,
    last_move_time: Millis,
    start: (i32, i32),
    last_code: (i32, i32),
    last: (i32, i32),
}

/// State machine for one keyboard surface.
#[derive(Debug)]
pub struct KeyboardView {
    layout: Layout,
    config: KeyboardConfig,
    layer: SurfaceLayer,
    state: TouchState,
    session: PointerSession,
    multitap: MultiTapState,
    swipe: SwipeClassifier,
    hover: HoverTracker,
    preview: PreviewState,
    timers: ViewTimers,
    repeat_key: Option<usize>,
    old_pointer_count: usize,
    old_pointer: (f32, f32),
    popup_request: Option<usize>,
    actions: Vec<KeyboardAction>,
    requests: Vec<SurfaceRequest>,
}

impl KeyboardView {
    /// Creates a view for the main surface.
    pub fn new(layout: Layout, config: KeyboardConfig) -> Self {
        Self::with_layer(layout, config, SurfaceLayer::Main)
    }

    /// Creates a view whose surface requests target `layer`.
    pub fn with_layer(layout: Layout, config: KeyboardConfig, layer: SurfaceLayer) -> Self {
        let swipe = SwipeClassifier::new(config.swipe_threshold(), config.disambiguate_swipe);
        let multitap = MultiTapState::new(config.timing.multitap_interval_ms);
        Self {
            layout,
            config,
            layer,
            state: TouchState::Idle,
            session: PointerSession::default(),
            multitap,
            swipe,
            hover: HoverTracker::new(),
            preview: PreviewState::default(),
            timers: ViewTimers::new(),
            repeat_key: None,
            old_pointer_count: 1,
            old_pointer: (0.0, 0.0),
            popup_request: None,
            actions: Vec::new(),
            requests: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The active layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The view configuration.
    pub fn config(&self) -> &KeyboardConfig {
        &self.config
    }

    /// Phase of the pointer session.
    pub fn state(&self) -> TouchState {
        self.state
    }

    /// Whether the session is aborted.
    pub fn is_aborted(&self) -> bool {
        self.state == TouchState::Aborted
    }

    /// The pointer session.
    pub fn session(&self) -> &PointerSession {
        &self.session
    }

    /// The multi-tap resolver.
    pub fn multitap(&self) -> &MultiTapState {
        &self.multitap
    }

    /// Whether the preview bubble is on screen.
    pub fn is_preview_visible(&self) -> bool {
        self.preview.visible
    }

    /// The key drawn pressed.
    pub fn pressed_key(&self) -> Option<usize> {
        self.preview.key
    }

    /// Whether any hover device is over a key.
    pub fn is_hovered(&self) -> bool {
        self.hover.is_hovered()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&mut self) -> Option<Millis> {
        self.timers.next_deadline()
    }

    /// Drains the emitted actions.
    pub fn take_actions(&mut self) -> Vec<KeyboardAction> {
        std::mem::take(&mut self.actions)
    }

    /// Drains the surface requests.
    pub fn take_requests(&mut self) -> Vec<SurfaceRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Takes the key whose long-press asked for a popup keyboard.
    pub fn take_popup_request(&mut self) -> Option<usize> {
        self.popup_request.take()
    }

    // =========================================================================
    // Configuration and layout
    // =========================================================================

    /// Enables or disables proximity correction.
    pub fn set_proximity_correction(&mut self, enabled: bool) {
        self.config.proximity_correction = enabled;
    }

    /// Sets the shift state, redrawing if it changed.
    pub fn set_shifted(&mut self, shifted: bool) -> bool {
        let changed = self.layout.set_shifted(shifted);
        if changed {
            self.request(SurfaceRequestKind::InvalidateAll);
        }
        changed
    }

    /// Replaces the layout. The active session is aborted and all timers cancelled.
    pub fn set_layout(&mut self, layout: Layout) {
        self.show_preview(None, self.session.last_move_time);
        self.hide_preview();
        self.timers.cancel_all();
        self.hover.clear();
        self.multitap.reset();
        self.repeat_key = None;
        self.popup_request = None;
        self.preview = PreviewState::default();
        self.layout = layout;
        self.state = TouchState::Aborted;
        self.request(SurfaceRequestKind::InvalidateAll);
        tracing::debug!(target: targets::VIEW, keys = self.layout.len(), "layout replaced");
    }

    /// Gives mutable access to the layout, redrawing afterwards.
    pub fn update_layout<R>(&mut self, f: impl FnOnce(&mut Layout) -> R) -> R {
        let result = f(&mut self.layout);
        self.request(SurfaceRequestKind::InvalidateAll);
        result
    }

    /// Fits the layout to a new surface width.
    ///
    /// On failure the previous geometry stays in effect.
    pub fn resize(&mut self, width: i32) -> Result<()> {
        match self.layout.resize(width) {
            Ok(()) => {
                self.request(SurfaceRequestKind::InvalidateAll);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(target: targets::VIEW, %err, "resize failed, keeping geometry");
                Err(err)
            }
        }
    }

    /// Abandons the current session. Motion is ignored until the next down.
    pub fn abort(&mut self) {
        self.timers.end_session();
        self.show_preview(None, self.session.last_move_time);
        self.abort_session();
    }

    /// Ends everything in progress: timers, preview, hover and the session.
    pub fn close(&mut self) {
        self.show_preview(None, self.session.last_move_time);
        self.hide_preview();
        self.timers.cancel_all();
        if self.hover.clear() {
            self.clear_hover_flags();
            self.request(SurfaceRequestKind::InvalidateAll);
        }
        self.repeat_key = None;
        self.popup_request = None;
        self.abort_session();
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Fires every timer due at or before `now`.
    pub fn tick(&mut self, now: Millis) {
        while let Some((due, action)) = self.timers.pop_due(now) {
            match action {
                TimerAction::Repeat => {
                    if self.repeat_key.is_some() && !self.is_aborted() {
                        self.repeat_key_tick(due);
                    }
                }
                TimerAction::LongPress => self.on_long_press(due),
                TimerAction::ShowPreview(key) => self.show_key(key),
                TimerAction::RemovePreview => self.hide_preview(),
            }
        }
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    /// Handles a contact pointer event. Returns whether it was consumed.
    ///
    /// Multi-pointer input is normalized to a single session: when a second
    /// pointer lands, the first is released at its last position; when only
    /// one remains, it starts a new session.
    pub fn on_pointer_event(&mut self, event: PointerEvent) -> bool {
        self.tick(event.time);

        if event.action == PointerAction::Cancel {
            self.old_pointer_count = 1;
            return self.on_single_pointer(event, false);
        }

        let count = event.pointer_count;
        let handled = if count != self.old_pointer_count {
            if count == 1 {
                let down = event.synthesized(PointerAction::Down, event.x, event.y);
                let mut handled = self.on_single_pointer(down, false);
                if event.action == PointerAction::Up {
                    handled = self.on_single_pointer(event, true);
                }
                handled
            } else {
                tracing::trace!(target: targets::VIEW, count, "second pointer, releasing first");
                let (x, y) = self.old_pointer;
                let up = event.synthesized(PointerAction::Up, x, y);
                self.on_single_pointer(up, true)
            }
        } else if count == 1 {
            let handled = self.on_single_pointer(event, false);
            self.old_pointer = (event.x, event.y);
            handled
        } else {
            true
        };

        self.old_pointer_count = count;
        handled
    }

    fn to_layout_coordinates(&self, x: f32, y: f32) -> (i32, i32) {
        // `as` saturates out-of-range floats and maps NaN to zero
        let x = (x as i32).saturating_sub(self.config.padding_left);
        let mut y = (y as i32).saturating_sub(self.config.padding_top);
        if y >= self.config.vertical_correction.saturating_neg() {
            y = y.saturating_add(self.config.vertical_correction);
        }
        (x, y)
    }

    #[tracing::instrument(level = "trace", skip(self), fields(action = ?event.action))]
    fn on_single_pointer(&mut self, event: PointerEvent, possible_poly: bool) -> bool {
        let (x, y) = self.to_layout_coordinates(event.x, event.y);
        let time = event.time;
        let action = event.action;
        let key_index = self.layout.locate(x, y, self.config.proximity_correction).key;
        self.swipe.set_possible_poly(possible_poly);

        if key_index.is_some_and(|index| !self.layout.is_key_enabled(index)) {
            return true;
        }

        if action == PointerAction::Down {
            self.swipe.begin(x as f32, y as f32, time);
        } else {
            self.swipe.add_point(x as f32, y as f32, time);
        }

        if self.is_aborted() && !matches!(action, PointerAction::Down | PointerAction::Cancel) {
            return true;
        }

        if matches!(action, PointerAction::Move | PointerAction::Up) && self.handle_swipe(action, x, y, time) {
            return true;
        }

        match action {
            PointerAction::Down => self.on_down(key_index, x, y, time),
            PointerAction::Move => self.on_move(key_index, time),
            PointerAction::Up => self.on_up(key_index, x, y, time),
            PointerAction::Cancel => self.on_cancel(time),
        }
        self.session.last = (x, y);
        true
    }

    fn handle_swipe(&mut self, action: PointerAction, x: i32, y: i32, time: Millis) -> bool {
        let outcome = self.swipe.classify(
            x as f32,
            y as f32,
            self.layout.total_width(),
            self.layout.total_height(),
        );
        match outcome {
            SwipeOutcome::Swipe(direction) => {
                self.timers.end_session();
                self.show_preview(None, time);
                self.actions.push(KeyboardAction::Swipe(direction));
                self.abort_session();
                true
            }
            SwipeOutcome::SendDownKey if action == PointerAction::Up => {
                self.timers.end_session();
                self.show_preview(None, time);
                let (start_x, start_y) = self.session.start;
                self.detect_and_send(self.session.down_key, start_x, start_y, time);
                self.abort_session();
                true
            }
            SwipeOutcome::SendDownKey | SwipeOutcome::None => false,
        }
    }

    fn on_down(&mut self, key_index: Option<usize>, x: i32, y: i32, time: Millis) {
        self.timers.end_session();
        self.repeat_key = None;
        self.state = TouchState::Down;
        self.session = PointerSession {
            down_key: key_index,
            current_key: key_index,
            last_key: None,
            down_time: time,
            current_key_time: 0,
            last_key_time: 0,
            last_move_time: time,
            start: (x, y),
            last_code: (x, y),
            last: (x, y),
        };
        self.multitap.on_key_struck(&self.layout, key_index, time);

        let key = key_index.and_then(|index| self.layout.key(index));
        let code = key.map_or(0, |k| k.primary_code());
        let repeatable = key.is_some_and(|k| k.repeatable);
        self.actions.push(KeyboardAction::Press { code });

        if repeatable {
            self.repeat_key = key_index;
            let timing = &self.config.timing;
            if let Err(err) = self.timers.start_repeat(
                time,
                timing.repeat_start_delay_ms,
                timing.repeat_interval_ms,
            ) {
                tracing::warn!(target: targets::VIEW, %err, "could not schedule key repeat");
            }
            self.repeat_key_tick(time);
            if self.is_aborted() {
                self.repeat_key = None;
                self.timers.cancel(|action| action == TimerAction::Repeat);
                return;
            }
        }

        if key_index.is_some() {
            self.timers.start(
                time,
                self.config.timing.long_press_timeout_ms,
                TimerAction::LongPress,
            );
        }
        self.show_preview(key_index, time);
    }

    fn on_move(&mut self, key_index: Option<usize>, time: Millis) {
        let session = &mut self.session;
        let elapsed = time.saturating_sub(session.last_move_time);
        let mut continue_long_press = false;

        if let Some(index) = key_index {
            match session.current_key {
                None => {
                    session.current_key = Some(index);
                    session.current_key_time = time.saturating_sub(session.down_time);
                }
                Some(current) if current == index => {
                    session.current_key_time += elapsed;
                    continue_long_press = true;
                }
                // the pressed key stays current while the finger drifts
                Some(_) if self.repeat_key.is_none() => {
                    session.last_key = session.down_key;
                    session.last_code = session.last;
                    session.last_key_time = session.current_key_time + elapsed;
                    session.current_key = session.down_key;
                    session.current_key_time = 0;
                    self.multitap.reset();
                }
                Some(_) => {}
            }
        }

        if !continue_long_press {
            self.timers.cancel(|action| action == TimerAction::LongPress);
            if key_index.is_some() {
                self.timers.start(
                    time,
                    self.config.timing.long_press_timeout_ms,
                    TimerAction::LongPress,
                );
            }
        }

        self.show_preview(self.session.current_key, time);
        self.session.last_move_time = time;
        self.state = TouchState::Moving;
    }

    fn on_up(&mut self, key_index: Option<usize>, x: i32, y: i32, time: Millis) {
        self.timers.end_session();

        let session = &mut self.session;
        let elapsed = time.saturating_sub(session.last_move_time);
        if key_index == session.current_key {
            session.current_key_time += elapsed;
        } else {
            session.last_key = session.current_key;
            session.last_key_time = session.current_key_time + elapsed;
            session.current_key = key_index;
            session.current_key_time = 0;
            self.multitap.reset();
        }

        let (mut commit_x, mut commit_y) = (x, y);
        let session = &mut self.session;
        if session.current_key_time < session.last_key_time
            && session.current_key_time < self.config.timing.debounce_ms
            && session.last_key.is_some()
        {
            tracing::trace!(target: targets::VIEW, last_key = ?session.last_key, "debounced release");
            session.current_key = session.last_key;
            (commit_x, commit_y) = session.last_code;
        }

        self.show_preview(None, time);
        if self.repeat_key.is_none() && !self.is_aborted() {
            self.detect_and_send(self.session.down_key, commit_x, commit_y, time);
        }
        if let Some(index) = key_index {
            self.request(SurfaceRequestKind::InvalidateKey(index));
        }
        self.repeat_key = None;
        if !self.is_aborted() {
            self.state = TouchState::Idle;
        }
    }

    fn on_cancel(&mut self, time: Millis) {
        self.timers.end_session();
        self.popup_request = None;
        self.abort_session();
        self.show_preview(None, time);
        if let Some(index) = self.session.current_key {
            self.request(SurfaceRequestKind::InvalidateKey(index));
        }
    }

    fn abort_session(&mut self) {
        self.state = TouchState::Aborted;
        self.repeat_key = None;
    }

    // =========================================================================
    // Commit
    // =========================================================================

    fn repeat_key_tick(&mut self, time: Millis) {
        let Some(position) = self
            .repeat_key
            .and_then(|index| self.layout.key(index))
            .map(|key| (key.x, key.y))
        else {
            return;
        };
        self.detect_and_send(self.session.current_key, position.0, position.1, time);
    }

    /// Commits `index` as hit at `(x, y)`.
    fn detect_and_send(&mut self, index: Option<usize>, x: i32, y: i32, time: Millis) {
        let Some((index, key)) = index.and_then(|i| self.layout.key(i).map(|k| (i, k))) else {
            tracing::trace!(target: targets::VIEW, "commit on no key");
            self.actions.push(KeyboardAction::NoKey);
            return;
        };

        let has_popup = key.has_popup();
        match key.text.clone() {
            Some(text) if !has_popup => {
                tracing::debug!(target: targets::VIEW, index, %text, "text committed");
                self.actions.push(KeyboardAction::Text(text));
                self.actions
                    .push(KeyboardAction::Release { code: NOT_A_KEY });
            }
            _ => {
                let key_codes = key.codes.clone();
                let candidates = self
                    .layout
                    .locate(x, y, self.config.proximity_correction)
                    .candidates;
                let (code, retract) = self.multitap.resolve(&key_codes);
                if self.multitap.in_multi_tap() {
                    if retract {
                        self.actions.push(KeyboardAction::DeleteProvisional);
                    }
                    self.actions.push(KeyboardAction::MultiTap { key: index });
                }
                tracing::debug!(target: targets::VIEW, index, code, "key committed");
                self.actions.push(KeyboardAction::KeyCommit {
                    code,
                    candidates,
                    has_popup,
                });
                self.actions.push(KeyboardAction::Release { code });
            }
        }
        self.multitap.record_sent(index, time);
    }

    fn on_long_press(&mut self, time: Millis) {
        let Some((index, code, has_popup)) = self
            .session
            .current_key
            .and_then(|index| self.layout.key(index).map(|k| (index, k.primary_code(), k.has_popup())))
        else {
            return;
        };

        tracing::debug!(target: targets::VIEW, index, has_popup, "long press");
        self.actions.push(KeyboardAction::LongPress { key: index, code });
        if has_popup {
            self.popup_request = Some(index);
            self.timers.end_session();
            self.abort_session();
            self.show_preview(None, time);
        }
    }

    // =========================================================================
    // Preview
    // =========================================================================

    fn show_preview(&mut self, key_index: Option<usize>, now: Millis) {
        let old = self.preview.key;
        if old == key_index {
            return;
        }
        self.preview.key = key_index;

        if let Some(old) = old
            && let Some(key) = self.layout.key_mut(old)
        {
            key.set_pressed(false);
            self.request(SurfaceRequestKind::InvalidateKey(old));
        }
        if let Some(new) = key_index
            && let Some(key) = self.layout.key_mut(new)
        {
            key.set_pressed(true);
            self.request(SurfaceRequestKind::InvalidateKey(new));
        }

        if !self.config.preview.enabled {
            return;
        }
        self.timers
            .cancel(|action| matches!(action, TimerAction::ShowPreview(_)));

        match key_index {
            None if self.preview.visible => {
                let delay = self.config.timing.preview_delay_after_ms;
                if delay == 0 {
                    self.hide_preview();
                } else {
                    self.timers.start(now, delay, TimerAction::RemovePreview);
                }
            }
            None => {}
            Some(key) if self.preview.visible => self.show_key(key),
            Some(key) => {
                let delay = self.config.timing.preview_delay_before_ms;
                if delay == 0 {
                    self.show_key(key);
                } else {
                    self.timers.start(now, delay, TimerAction::ShowPreview(key));
                }
            }
        }
    }

    fn preview_label(&self, key: usize) -> String {
        let Some(k) = self.layout.key(key) else {
            return String::new();
        };
        let label = if self.multitap.in_multi_tap() {
            let position = self.multitap.tap_count().unwrap_or(0);
            k.codes
                .get(position)
                .and_then(|&code| u32::try_from(code).ok())
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| k.label.clone())
        } else {
            k.label.clone()
        };
        self.layout.adjust_case(&label)
    }

    fn show_key(&mut self, key: usize) {
        let label = self.preview_label(key);
        let Some(bubble) = PreviewBubble::place(&self.layout, key, label, &self.config) else {
            return;
        };
        self.timers
            .cancel(|action| action == TimerAction::RemovePreview);
        self.preview.visible = true;
        self.request(SurfaceRequestKind::ShowPreview(bubble));
    }

    fn hide_preview(&mut self) {
        if self.preview.visible {
            self.preview.visible = false;
            self.request(SurfaceRequestKind::HidePreview);
        }
    }

    // =========================================================================
    // Hover
    // =========================================================================

    /// Handles a hover event. Hover never commits; it only marks keys.
    pub fn on_hover_event(&mut self, event: HoverEvent) -> bool {
        let key_index = if event.action == HoverAction::Exit {
            None
        } else {
            let (x, y) = self.to_layout_coordinates(event.x, event.y);
            self.layout.locate(x, y, self.config.proximity_correction).key
        };

        let change = self.hover.update(event.device_id, key_index);
        for index in change.keys() {
            let hovered = self.hover.is_key_hovered(index);
            if let Some(key) = self.layout.key_mut(index) {
                key.set_hovered(hovered);
            }
            self.request(SurfaceRequestKind::InvalidateKey(index));
        }
        true
    }

    /// Leaves the hover state. Clearing hovered keys redraws everything.
    pub fn set_hovered(&mut self, hovered: bool) {
        if !hovered && self.hover.clear() {
            self.clear_hover_flags();
            self.request(SurfaceRequestKind::InvalidateAll);
        }
    }

    fn clear_hover_flags(&mut self) {
        for index in 0..self.layout.len() {
            if let Some(key) = self.layout.key_mut(index) {
                key.set_hovered(false);
            }
        }
    }

    fn request(&mut self, kind: SurfaceRequestKind) {
        self.requests.push(SurfaceRequest::new(self.layer, kind));
    }
}

#[cfg(test)]
mod tests;
