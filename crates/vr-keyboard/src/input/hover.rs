//! Per-device hover tracking.

use std::collections::HashMap;

use vr_keyboard_core::DeviceId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct HoverSlot {
    previous: Option<usize>,
    current: Option<usize>,
}

/// Keys whose hover state changed after an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoverChange {
    /// The key the device now hovers, if it changed.
    pub entered: Option<usize>,
    /// The key the device stopped hovering, if it changed.
    pub left: Option<usize>,
}

impl HoverChange {
    /// Changed key indices, entered first.
    pub fn keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.entered.into_iter().chain(self.left)
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.entered.is_none() && self.left.is_none()
    }
}

/// Tracks which key each hover device is over.
#[derive(Debug, Clone, Default)]
pub struct HoverTracker {
    slots: HashMap<DeviceId, HoverSlot>,
}

impl HoverTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `device` now hovers `key`.
    pub fn update(&mut self, device: DeviceId, key: Option<usize>) -> HoverChange {
        let slot = self.slots.entry(device).or_default();
        slot.previous = slot.current;
        slot.current = key;

        let (previous, current) = (slot.previous, slot.current);
        if previous == current {
            return HoverChange::default();
        }
        HoverChange {
            entered: current,
            left: previous,
        }
    }

    /// The key hovered by `device`.
    pub fn hovered_key(&self, device: DeviceId) -> Option<usize> {
        self.slots.get(&device).and_then(|slot| slot.current)
    }

    /// Whether any device hovers `key`.
    pub fn is_key_hovered(&self, key: usize) -> bool {
        self.slots.values().any(|slot| slot.current == Some(key))
    }

    /// Whether any device hovers a key.
    pub fn is_hovered(&self) -> bool {
        self.slots.values().any(|slot| slot.current.is_some())
    }

    /// Forgets all devices. Returns whether any key was hovered.
    pub fn clear(&mut self) -> bool {
        let was_hovered = self.is_hovered();
        self.slots.clear();
        was_hovered
    }
}
