//! Popup keyboards for alternate characters.
//!
//! Long-pressing a key with alternate characters opens a small keyboard built
//! from those characters, anchored at the key. It has its own view and state
//! machine; the controller routes events to it while it is showing.

use vr_keyboard_core::logging::targets;
use vr_keyboard_core::{HoverEvent, PerfSpan, PointerEvent};

use crate::config::KeyboardConfig;
use crate::layout::{Layout, PopupGeometry};
use crate::surface::SurfaceLayer;
use crate::view::KeyboardView;

/// Orders popup characters for the side the popup opens on.
///
/// Right-aligned popups grow leftward, so their order is mirrored: a single
/// row is reversed; with several rows the first character moves to the end
/// of the first row and the last character takes its place.
pub fn popup_characters(characters: &str, right_aligned: bool, columns: usize) -> String {
    if !right_aligned {
        return characters.to_owned();
    }
    let mut chars: Vec<char> = characters.chars().collect();
    if chars.len() > columns && columns > 0 {
        let first = chars[0];
        chars.insert(columns - 1, first);
        if let Some(last) = chars.pop() {
            chars[0] = last;
        }
    } else {
        chars.reverse();
    }
    chars.into_iter().collect()
}

/// A popup keyboard opened from a key of the main layout.
#[derive(Debug)]
pub struct PopupKeyboard {
    view: KeyboardView,
    source_key: usize,
    origin: (i32, i32),
    right_aligned: bool,
}

impl PopupKeyboard {
    /// Opens a popup for `key` of `main`, or `None` if the key has no
    /// alternate characters.
    ///
    /// The popup starts aborted, so the rest of the gesture that opened it
    /// commits nothing.
    pub fn open(main: &Layout, key: usize, config: &KeyboardConfig) -> Option<Self> {
        let _span = PerfSpan::new("popup_open");
        let source = main.key(key)?;
        let alternates = source
            .alternate_characters
            .as_deref()
            .filter(|chars| !chars.is_empty())?;

        let right_aligned = source.x * 2 + source.width >= main.total_width();
        let columns = config.popup.columns;
        let characters = popup_characters(alternates, right_aligned, columns);
        let geometry = PopupGeometry {
            key_width: source.width,
            key_height: source.height,
            horizontal_gap: source.gap,
            vertical_gap: config.popup.vertical_gap,
            columns,
            horizontal_padding: 0,
            display_width: main.total_width(),
        };
        let mut layout = Layout::from_characters(&characters, &geometry);
        layout.set_shifted(main.is_shifted());

        let x = if right_aligned {
            (source.x + source.width - layout.total_width()).max(0)
        } else {
            source.x
        };
        let origin = (
            x + config.padding_left,
            source.y + config.padding_top + config.popup.vertical_offset,
        );

        tracing::debug!(
            target: targets::POPUP,
            key,
            %characters,
            right_aligned,
            ?origin,
            "opening popup keyboard"
        );

        let mut view = KeyboardView::with_layer(layout, config.for_popup(), SurfaceLayer::Popup);
        view.abort();
        Some(Self {
            view,
            source_key: key,
            origin,
            right_aligned,
        })
    }

    /// The popup's view.
    pub fn view(&self) -> &KeyboardView {
        &self.view
    }

    pub(crate) fn view_mut(&mut self) -> &mut KeyboardView {
        &mut self.view
    }

    /// Index of the main-layout key that opened the popup.
    pub fn source_key(&self) -> usize {
        self.source_key
    }

    /// Top-left corner in main-surface coordinates.
    pub fn origin(&self) -> (i32, i32) {
        self.origin
    }

    /// Width and height.
    pub fn size(&self) -> (i32, i32) {
        let layout = self.view.layout();
        (layout.total_width(), layout.total_height())
    }

    /// Whether the popup grows leftward from the key's right edge.
    pub fn is_right_aligned(&self) -> bool {
        self.right_aligned
    }

    /// Whether a main-surface point lies on the popup.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let (left, top) = self.origin;
        let (width, height) = self.size();
        let (x, y) = (x as i32, y as i32);
        x >= left && x < left + width && y >= top && y < top + height
    }

    /// Feeds a main-surface pointer event to the popup.
    pub fn on_pointer_event(&mut self, event: PointerEvent) -> bool {
        let (dx, dy) = self.origin_f32();
        self.view.on_pointer_event(event.translated(dx, dy))
    }

    /// Feeds a main-surface hover event to the popup.
    pub fn on_hover_event(&mut self, event: HoverEvent) -> bool {
        let (dx, dy) = self.origin_f32();
        self.view.on_hover_event(event.translated(dx, dy))
    }

    fn origin_f32(&self) -> (f32, f32) {
        (self.origin.0 as f32, self.origin.1 as f32)
    }
}
