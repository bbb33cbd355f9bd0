//! The keyboard controller.
//!
//! [`Keyboard`] owns the main view and, while one is showing, the popup
//! keyboard. It routes host events to the right view and publishes everything
//! they produce on two signals: [`Keyboard::actions`] for the text-input side
//! and [`Keyboard::surface_requests`] for the drawing side.
//!
//! Signals are emitted after the internal lock is released, so a slot may call
//! back into the keyboard (for example to toggle shift on a shift commit).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use vr_keyboard::prelude::*;
//!
//! let layout = LayoutBuilder::new()
//!     .key_size(40, 40)
//!     .row([Key::char('h'), Key::char('i')])
//!     .build()
//!     .unwrap();
//! let keyboard = Keyboard::new(layout, KeyboardConfig::default()).unwrap();
//!
//! let typed = Arc::new(Mutex::new(String::new()));
//! let sink = typed.clone();
//! keyboard.actions().connect(move |action| {
//!     if let KeyboardAction::KeyCommit { code, .. } = action {
//!         sink.lock().extend(char::from_u32(*code as u32));
//!     }
//! });
//!
//! keyboard.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
//! keyboard.on_pointer_event(PointerEvent::up(20.0, 20.0, 40));
//! keyboard.on_pointer_event(PointerEvent::down(60.0, 20.0, 400));
//! keyboard.on_pointer_event(PointerEvent::up(60.0, 20.0, 440));
//! assert_eq!(*typed.lock(), "hi");
//! ```

use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use vr_keyboard_core::logging::targets;
use vr_keyboard_core::{ConnectionId, HoverEvent, Millis, PointerAction, PointerEvent, Signal};

use crate::action::{KeyboardAction, TextInputSink, forward_to_sink};
use crate::config::KeyboardConfig;
use crate::error::Result;
use crate::layout::{KeyboardVariant, Layout, LayoutSet};
use crate::popup::PopupKeyboard;
use crate::surface::{SurfaceLayer, SurfaceRequest, SurfaceRequestKind};
use crate::view::KeyboardView;

/// Output collected while the lock is held.
#[derive(Debug, Default)]
struct Pending {
    actions: Vec<KeyboardAction>,
    requests: Vec<SurfaceRequest>,
}

impl Pending {
    fn collect(&mut self, view: &mut KeyboardView) {
        self.actions.extend(view.take_actions());
        self.requests.extend(view.take_requests());
    }
}

#[derive(Debug)]
struct KeyboardState {
    main: KeyboardView,
    popup: Option<PopupKeyboard>,
    layouts: Option<LayoutSet>,
    variant: KeyboardVariant,
    pending: Pending,
}

impl KeyboardState {
    fn on_pointer_event(&mut self, event: PointerEvent) -> bool {
        let Some(popup) = self.popup.as_mut() else {
            let handled = self.main.on_pointer_event(event);
            self.after_main();
            return handled;
        };

        match event.action {
            PointerAction::Cancel => {
                self.dismiss_popup();
                let handled = self.main.on_pointer_event(event);
                self.pending.collect(&mut self.main);
                handled
            }
            PointerAction::Down if !popup.contains(event.x, event.y) => {
                tracing::debug!(target: targets::POPUP, "tap outside popup");
                self.dismiss_popup();
                true
            }
            _ => {
                let handled = popup.on_pointer_event(event);
                let actions = popup.view_mut().take_actions();
                let requests = popup.view_mut().take_requests();
                let terminal = actions.iter().any(KeyboardAction::is_terminal);
                self.pending.actions.extend(actions);
                self.pending.requests.extend(requests);
                if terminal {
                    self.dismiss_popup();
                }
                self.main.tick(event.time);
                self.pending.collect(&mut self.main);
                handled
            }
        }
    }

    fn on_hover_event(&mut self, event: HoverEvent) -> bool {
        match self.popup.as_mut() {
            Some(popup) => {
                let handled = popup.on_hover_event(event);
                self.pending.collect(popup.view_mut());
                handled
            }
            None => {
                let handled = self.main.on_hover_event(event);
                self.pending.collect(&mut self.main);
                handled
            }
        }
    }

    fn tick(&mut self, now: Millis) {
        self.main.tick(now);
        self.after_main();
        if let Some(popup) = self.popup.as_mut() {
            popup.view_mut().tick(now);
            self.pending.collect(popup.view_mut());
        }
    }

    fn next_deadline(&mut self) -> Option<Millis> {
        let main = self.main.next_deadline();
        let popup = self
            .popup
            .as_mut()
            .and_then(|popup| popup.view_mut().next_deadline());
        match (main, popup) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Collects main-view output and opens a popup if a long-press asked for one.
    fn after_main(&mut self) {
        self.pending.collect(&mut self.main);
        let Some(key) = self.main.take_popup_request() else {
            return;
        };
        let Some(popup) = PopupKeyboard::open(self.main.layout(), key, self.main.config()) else {
            return;
        };
        let (x, y) = popup.origin();
        let (width, height) = popup.size();
        self.pending.requests.push(SurfaceRequest::new(
            SurfaceLayer::Popup,
            SurfaceRequestKind::PopupShown {
                x,
                y,
                width,
                height,
            },
        ));
        self.popup = Some(popup);
    }

    fn dismiss_popup(&mut self) -> bool {
        let Some(mut popup) = self.popup.take() else {
            return false;
        };
        let view = popup.view_mut();
        view.close();
        self.pending.collect(view);
        self.pending.requests.push(SurfaceRequest::new(
            SurfaceLayer::Popup,
            SurfaceRequestKind::PopupDismissed,
        ));
        self.pending.requests.push(SurfaceRequest::new(
            SurfaceLayer::Main,
            SurfaceRequestKind::InvalidateAll,
        ));
        tracing::debug!(target: targets::POPUP, source_key = popup.source_key(), "popup dismissed");
        true
    }

    fn set_layout(&mut self, layout: Layout) {
        self.dismiss_popup();
        self.main.set_layout(layout);
        self.pending.collect(&mut self.main);
    }
}

/// The soft keyboard: main view, popup keyboard and output signals.
///
/// `Keyboard` is `Send + Sync`; every method takes `&self`.
pub struct Keyboard {
    state: Mutex<KeyboardState>,
    actions: Signal<KeyboardAction>,
    surface: Signal<SurfaceRequest>,
}

impl Keyboard {
    /// Creates a keyboard showing `layout`.
    pub fn new(layout: Layout, config: KeyboardConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_state(KeyboardState {
            main: KeyboardView::new(layout, config),
            popup: None,
            layouts: None,
            variant: KeyboardVariant::Main,
            pending: Pending::default(),
        }))
    }

    /// Creates a keyboard that can switch between the variants of `layouts`,
    /// starting on the main one.
    pub fn with_layout_set(layouts: LayoutSet, config: KeyboardConfig) -> Result<Self> {
        config.validate()?;
        let main = KeyboardView::new(layouts.main().clone(), config);
        Ok(Self::from_state(KeyboardState {
            main,
            popup: None,
            layouts: Some(layouts),
            variant: KeyboardVariant::Main,
            pending: Pending::default(),
        }))
    }

    fn from_state(state: KeyboardState) -> Self {
        Self {
            state: Mutex::new(state),
            actions: Signal::new(),
            surface: Signal::new(),
        }
    }

    /// Runs `f` on the state, then emits what it produced.
    fn with_state<R>(&self, f: impl FnOnce(&mut KeyboardState) -> R) -> R {
        let (result, pending) = {
            let mut state = self.state.lock();
            let result = f(&mut state);
            (result, std::mem::take(&mut state.pending))
        };
        for action in pending.actions {
            self.actions.emit(action);
        }
        for request in pending.requests {
            self.surface.emit(request);
        }
        result
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Signal carrying every keyboard action.
    pub fn actions(&self) -> &Signal<KeyboardAction> {
        &self.actions
    }

    /// Signal carrying draw requests for the host surface.
    pub fn surface_requests(&self) -> &Signal<SurfaceRequest> {
        &self.surface
    }

    /// Forwards actions to a text-input sink.
    pub fn attach_sink<S>(&self, sink: Arc<Mutex<S>>) -> ConnectionId
    where
        S: TextInputSink + 'static,
    {
        self.actions
            .connect(move |action| forward_to_sink(action, &mut *sink.lock()))
    }

    /// Queues actions on an unbounded channel for hosts that poll.
    ///
    /// Disconnect the returned id to stop queueing.
    pub fn action_channel(&self) -> (ConnectionId, Receiver<KeyboardAction>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let id = self.actions.connect(move |action| {
            if sender.send(action.clone()).is_err() {
                tracing::trace!(target: targets::SIGNAL, "action receiver dropped");
            }
        });
        (id, receiver)
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Handles a contact pointer event in main-surface coordinates.
    ///
    /// While a popup is showing, events go to the popup; a down outside it
    /// dismisses the popup and is consumed.
    pub fn on_pointer_event(&self, event: PointerEvent) -> bool {
        self.with_state(|state| state.on_pointer_event(event))
    }

    /// Handles a hover event in main-surface coordinates.
    pub fn on_hover_event(&self, event: HoverEvent) -> bool {
        self.with_state(|state| state.on_hover_event(event))
    }

    /// Leaves the hover state on every surface.
    pub fn set_hovered(&self, hovered: bool) {
        self.with_state(|state| {
            state.main.set_hovered(hovered);
            state.pending.collect(&mut state.main);
            if let Some(popup) = state.popup.as_mut() {
                popup.view_mut().set_hovered(hovered);
                state.pending.collect(popup.view_mut());
            }
        });
    }

    /// Advances the clock, firing due timers.
    pub fn tick(&self, now: Millis) {
        self.with_state(|state| state.tick(now));
    }

    /// Earliest pending timer deadline across both views.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.state.lock().next_deadline()
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Replaces the main layout, dismissing any popup and aborting the session.
    pub fn set_layout(&self, layout: Layout) {
        self.with_state(|state| state.set_layout(layout));
    }

    /// Switches to a variant of the layout set. Returns `false` if the set has
    /// no such variant or the keyboard was built without a set.
    pub fn select_variant(&self, variant: KeyboardVariant) -> bool {
        self.with_state(|state| {
            let Some(layout) = state
                .layouts
                .as_ref()
                .and_then(|layouts| layouts.get(variant))
                .cloned()
            else {
                tracing::warn!(target: targets::LAYOUT, ?variant, "no layout for variant");
                return false;
            };
            state.set_layout(layout);
            state.variant = variant;
            true
        })
    }

    /// The selected variant.
    pub fn variant(&self) -> KeyboardVariant {
        self.state.lock().variant
    }

    /// Sets the shift state. Returns whether it changed.
    pub fn set_shifted(&self, shifted: bool) -> bool {
        self.with_state(|state| {
            let changed = state.main.set_shifted(shifted);
            state.pending.collect(&mut state.main);
            changed
        })
    }

    /// Whether the main layout is shifted.
    pub fn is_shifted(&self) -> bool {
        self.state.lock().main.layout().is_shifted()
    }

    /// Enables or disables proximity correction.
    pub fn set_proximity_correction(&self, enabled: bool) {
        self.state.lock().main.set_proximity_correction(enabled);
    }

    /// Fits the main layout to a new surface width.
    pub fn resize(&self, width: i32) -> Result<()> {
        self.with_state(|state| {
            let result = state.main.resize(width);
            state.pending.collect(&mut state.main);
            result
        })
    }

    /// Reads the main layout.
    pub fn with_layout<R>(&self, f: impl FnOnce(&Layout) -> R) -> R {
        f(self.state.lock().main.layout())
    }

    /// Modifies the main layout in place (labels, disabled keys, shift).
    pub fn update_layout<R>(&self, f: impl FnOnce(&mut Layout) -> R) -> R {
        self.with_state(|state| {
            let result = state.main.update_layout(f);
            state.pending.collect(&mut state.main);
            result
        })
    }

    // =========================================================================
    // Popup
    // =========================================================================

    /// Whether a popup keyboard is showing.
    pub fn is_popup_showing(&self) -> bool {
        self.state.lock().popup.is_some()
    }

    /// Bounds of the showing popup as `(x, y, width, height)`.
    pub fn popup_bounds(&self) -> Option<(i32, i32, i32, i32)> {
        self.state.lock().popup.as_ref().map(|popup| {
            let (x, y) = popup.origin();
            let (width, height) = popup.size();
            (x, y, width, height)
        })
    }

    /// Closes the popup keyboard. Returns whether one was showing.
    pub fn dismiss_popup(&self) -> bool {
        self.with_state(KeyboardState::dismiss_popup)
    }

    /// Handles the back button: closes the popup if one is showing.
    /// Returns whether the press was consumed.
    pub fn handle_back(&self) -> bool {
        self.dismiss_popup()
    }

    /// Tears down everything in progress.
    pub fn close(&self) {
        self.with_state(|state| {
            state.dismiss_popup();
            state.main.close();
            state.pending.collect(&mut state.main);
        });
    }
}

impl std::fmt::Debug for Keyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keyboard")
            .field("state", &*self.state.lock())
            .field("actions", &self.actions)
            .field("surface", &self.surface)
            .finish()
    }
}

static_assertions::assert_impl_all!(Keyboard: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Key, LayoutBuilder, codes};

    fn layout() -> Layout {
        LayoutBuilder::new()
            .key_size(40, 40)
            .row([Key::char('a').with_alternates("áà"), Key::char('b')])
            .row([Key::new([codes::MODE_CHANGE]).with_label("?123"), Key::char('c')])
            .build()
            .unwrap()
    }

    fn symbols() -> Layout {
        LayoutBuilder::new()
            .key_size(40, 40)
            .row([Key::char('1'), Key::char('2')])
            .build()
            .unwrap()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = KeyboardConfig::default();
        config.popup.columns = 0;
        assert!(Keyboard::new(layout(), config).is_err());
    }

    #[test]
    fn test_select_variant() {
        let set = LayoutSet::new(layout()).with_symbols(symbols(), symbols());
        let keyboard = Keyboard::with_layout_set(set, KeyboardConfig::default()).unwrap();
        assert!(keyboard.select_variant(KeyboardVariant::Symbols1));
        assert_eq!(keyboard.variant(), KeyboardVariant::Symbols1);
        assert_eq!(keyboard.with_layout(Layout::len), 2);

        assert!(keyboard.select_variant(KeyboardVariant::Main));
        assert_eq!(keyboard.with_layout(Layout::len), 4);

        let plain = Keyboard::new(layout(), KeyboardConfig::default()).unwrap();
        assert!(!plain.select_variant(KeyboardVariant::Symbols2));
        assert_eq!(plain.variant(), KeyboardVariant::Main);
    }

    #[test]
    fn test_next_deadline_tracks_long_press() {
        let keyboard = Keyboard::new(layout(), KeyboardConfig::default()).unwrap();
        assert_eq!(keyboard.next_deadline(), None);
        keyboard.on_pointer_event(PointerEvent::down(60.0, 20.0, 100));
        assert_eq!(keyboard.next_deadline(), Some(600));
    }

    #[test]
    fn test_long_press_opens_popup() {
        let keyboard = Keyboard::new(layout(), KeyboardConfig::default()).unwrap();
        let (sender, requests) = crossbeam_channel::unbounded();
        keyboard.surface_requests().connect(move |request| {
            let _ = sender.send(request.clone());
        });

        keyboard.on_pointer_event(PointerEvent::down(20.0, 20.0, 0));
        keyboard.tick(500);
        assert!(keyboard.is_popup_showing());
        assert_eq!(keyboard.popup_bounds(), Some((0, 0, 80, 40)));
        assert!(requests.try_iter().any(|request| request
            == SurfaceRequest::new(
                SurfaceLayer::Popup,
                SurfaceRequestKind::PopupShown {
                    x: 0,
                    y: 0,
                    width: 80,
                    height: 40
                }
            )));

        assert!(keyboard.handle_back());
        assert!(!keyboard.is_popup_showing());
        assert!(!keyboard.handle_back());
        assert!(requests.try_iter().any(|request| request.kind == SurfaceRequestKind::PopupDismissed));
    }

    #[test]
    fn test_slot_can_reenter_keyboard() {
        let keyboard = Arc::new(Keyboard::new(layout(), KeyboardConfig::default()).unwrap());
        let weak = Arc::downgrade(&keyboard);
        keyboard.actions().connect(move |action| {
            if let (KeyboardAction::KeyCommit { .. }, Some(keyboard)) = (action, weak.upgrade()) {
                keyboard.set_shifted(!keyboard.is_shifted());
            }
        });

        keyboard.on_pointer_event(PointerEvent::down(60.0, 20.0, 0));
        keyboard.on_pointer_event(PointerEvent::up(60.0, 20.0, 30));
        assert!(keyboard.is_shifted());
    }
}
