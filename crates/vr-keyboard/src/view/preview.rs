//! Key preview bubble.

use crate::config::KeyboardConfig;
use crate::layout::Layout;

/// Where and what the host should draw as the enlarged key preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewBubble {
    /// Index of the previewed key.
    pub key: usize,
    /// Text shown in the bubble.
    pub label: String,
    /// Left edge in surface coordinates.
    pub x: i32,
    /// Top edge in surface coordinates.
    pub y: i32,
    /// Width.
    pub width: i32,
    /// Height.
    pub height: i32,
}

impl PreviewBubble {
    /// Places the bubble above `key`.
    ///
    /// If it would leave the top of the surface, it is moved down beside the
    /// key instead, toward the keyboard's center.
    pub fn place(layout: &Layout, key: usize, label: String, config: &KeyboardConfig) -> Option<Self> {
        let k = layout.key(key)?;
        let height = config.preview.height;
        let mut x = k.x + config.padding_left;
        let mut y = k.y + config.padding_top - height + config.preview.offset;

        if y < 0 {
            let shift = (k.width as f32 * 2.5) as i32;
            if k.x + k.width <= layout.total_width() / 2 {
                x += shift;
            } else {
                x -= shift;
            }
            y += height;
        }

        Some(Self {
            key,
            label,
            x,
            y,
            width: k.width,
            height,
        })
    }
}

/// Pressed-key and bubble visibility state.
#[derive(Debug, Clone, Default)]
pub(crate) struct PreviewState {
    /// The key currently drawn pressed.
    pub(crate) key: Option<usize>,
    /// Whether the bubble is on screen.
    pub(crate) visible: bool,
}
