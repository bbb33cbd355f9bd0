//! Pointer event types delivered by the host surface.

use crate::timer::Millis;

/// Identifier of the input device (controller, hand, mouse) producing events.
pub type DeviceId = u32;

/// The phase of a contact pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerAction {
    /// A contact started.
    Down,
    /// A contact moved.
    Move,
    /// A contact ended.
    Up,
    /// The host cancelled the gesture (focus loss, surface hidden).
    Cancel,
}

/// The phase of a hover (non-contact) pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverAction {
    /// The pointer entered the surface.
    Enter,
    /// The pointer moved over the surface.
    Move,
    /// The pointer left the surface.
    Exit,
}

/// A contact pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The action of this event.
    pub action: PointerAction,
    /// X coordinate of the primary pointer.
    pub x: f32,
    /// Y coordinate of the primary pointer.
    pub y: f32,
    /// Logical event time in milliseconds.
    pub time: Millis,
    /// Number of pointers currently in contact, including this one.
    pub pointer_count: usize,
    /// The device that produced the event.
    pub device_id: DeviceId,
}

impl PointerEvent {
    /// Creates a single-pointer event from device 0.
    pub fn new(action: PointerAction, x: f32, y: f32, time: Millis) -> Self {
        Self {
            action,
            x,
            y,
            time,
            pointer_count: 1,
            device_id: 0,
        }
    }

    /// Creates a single-pointer down event.
    pub fn down(x: f32, y: f32, time: Millis) -> Self {
        Self::new(PointerAction::Down, x, y, time)
    }

    /// Creates a single-pointer move event.
    pub fn moved(x: f32, y: f32, time: Millis) -> Self {
        Self::new(PointerAction::Move, x, y, time)
    }

    /// Creates a single-pointer up event.
    pub fn up(x: f32, y: f32, time: Millis) -> Self {
        Self::new(PointerAction::Up, x, y, time)
    }

    /// Creates a cancel event.
    pub fn cancel(time: Millis) -> Self {
        Self::new(PointerAction::Cancel, 0.0, 0.0, time)
    }

    /// Returns a copy with a different pointer count.
    pub fn with_pointer_count(mut self, pointer_count: usize) -> Self {
        self.pointer_count = pointer_count;
        self
    }

    /// Returns a copy attributed to another device.
    pub fn with_device(mut self, device_id: DeviceId) -> Self {
        self.device_id = device_id;
        self
    }

    /// Returns a copy with the same timing and count but another action and position.
    pub fn synthesized(&self, action: PointerAction, x: f32, y: f32) -> Self {
        Self {
            action,
            x,
            y,
            ..*self
        }
    }

    /// Returns a copy translated by `(-dx, -dy)`, for routing into a child surface.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x - dx,
            y: self.y - dy,
            ..*self
        }
    }
}

/// A hover pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverEvent {
    /// The action of this event.
    pub action: HoverAction,
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// The device that produced the event.
    pub device_id: DeviceId,
}

impl HoverEvent {
    /// Creates a hover event.
    pub fn new(action: HoverAction, x: f32, y: f32, device_id: DeviceId) -> Self {
        Self {
            action,
            x,
            y,
            device_id,
        }
    }

    /// Returns a copy translated by `(-dx, -dy)`.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x - dx,
            y: self.y - dy,
            ..*self
        }
    }
}
