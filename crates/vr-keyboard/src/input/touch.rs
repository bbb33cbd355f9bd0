//! Conversion from winit touch events.
//!
//! [`TouchAdapter`] tracks the active touches of one device so every
//! converted [`PointerEvent`] carries the pointer count the keyboard's
//! multi-pointer normalization relies on.
//!
//! ```ignore
//! use vr_keyboard::input::touch::TouchAdapter;
//!
//! let mut adapter = TouchAdapter::new(0);
//!
//! // In the winit event loop:
//! let event = adapter.handle_touch(touch, now_ms);
//! keyboard.on_pointer_event(event);
//! ```

use std::collections::HashMap;

use winit::event::{Touch, TouchPhase as WinitTouchPhase};

use vr_keyboard_core::{DeviceId, Millis, PointerAction, PointerEvent};

/// Converts a winit touch phase to a pointer action.
pub fn from_winit_touch_phase(phase: WinitTouchPhase) -> PointerAction {
    match phase {
        WinitTouchPhase::Started => PointerAction::Down,
        WinitTouchPhase::Moved => PointerAction::Move,
        WinitTouchPhase::Ended => PointerAction::Up,
        WinitTouchPhase::Cancelled => PointerAction::Cancel,
    }
}

/// Converts winit touches of one device into keyboard pointer events.
#[derive(Debug, Clone)]
pub struct TouchAdapter {
    device_id: DeviceId,
    active: HashMap<u64, (f32, f32)>,
}

impl TouchAdapter {
    /// Creates an adapter attributing events to `device_id`.
    pub fn new(device_id: DeviceId) -> Self {
        Self {
            device_id,
            active: HashMap::new(),
        }
    }

    /// Converts a touch delivered at logical time `time`.
    ///
    /// The pointer count includes a touch that is ending, matching the
    /// count seen on the event that lifts it.
    pub fn handle_touch(&mut self, touch: Touch, time: Millis) -> PointerEvent {
        let x = touch.location.x as f32;
        let y = touch.location.y as f32;
        let action = from_winit_touch_phase(touch.phase);

        let pointer_count = match action {
            PointerAction::Down | PointerAction::Move => {
                self.active.insert(touch.id, (x, y));
                self.active.len()
            }
            PointerAction::Up | PointerAction::Cancel => {
                let count = self.active.len().max(1);
                self.active.remove(&touch.id);
                count
            }
        };

        PointerEvent {
            action,
            x,
            y,
            time,
            pointer_count,
            device_id: self.device_id,
        }
    }

    /// Number of touches currently down.
    pub fn active_touch_count(&self) -> usize {
        self.active.len()
    }

    /// Forgets all touches.
    pub fn reset(&mut self) {
        self.active.clear();
    }
}
