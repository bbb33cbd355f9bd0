//! Keyboard layout model.
//!
//! A [`Layout`] is an ordered list of [`Key`]s with fixed geometry and codes,
//! plus the values derived from them once at build time: total size,
//! proximity threshold and the indices of the special keys.
//!
//! Layouts are built with [`LayoutBuilder`], generated from a string of
//! characters with [`Layout::from_characters`] (popup keyboards), or
//! deserialized from a [`LayoutSpec`].
//!
//! # Example
//!
//! ```
//! use vr_keyboard::layout::{Key, LayoutBuilder};
//!
//! let layout = LayoutBuilder::new()
//!     .key_size(40, 40)
//!     .row([Key::char('q'), Key::char('w'), Key::char('e')])
//!     .row([Key::new([32]).with_label("space").with_size(120, 40)])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(layout.len(), 4);
//! assert_eq!(layout.total_width(), 120);
//! assert_eq!(layout.space_key_index(), Some(3));
//! ```

mod builder;
mod set;
mod spec;

use std::collections::BTreeSet;
use std::ops::Range;

use vr_keyboard_core::PerfSpan;
use vr_keyboard_core::logging::targets;

use crate::error::{KeyboardError, Result};
use crate::input::hit_test::{self, HitResult};

pub use builder::{LayoutBuilder, PopupGeometry};
pub use set::{KeyboardVariant, LayoutSet};
pub use spec::{KeySpec, LayoutSpec, RowSpec};

/// Special key codes.
pub mod codes {
    /// Shift key.
    pub const SHIFT: i32 = -1;
    /// Switch between alphabetic and symbol layouts.
    pub const MODE_CHANGE: i32 = -2;
    /// Cancel / close the keyboard.
    pub const CANCEL: i32 = -3;
    /// Done / go editor action.
    pub const DONE: i32 = -4;
    /// Delete the character before the cursor.
    pub const DELETE: i32 = -5;
    /// Alt modifier.
    pub const ALT: i32 = -6;
    /// Switch between the two symbol layouts.
    pub const SYMBOLS_CHANGE: i32 = -10;
    /// Voice input.
    pub const VOICE_INPUT: i32 = -11;
    /// Switch input language.
    pub const LANGUAGE_CHANGE: i32 = -12;
    /// Emoji panel.
    pub const EMOJI: i32 = -13;
    /// Domain suffix key (".com").
    pub const DOMAIN: i32 = -14;
    /// Newline.
    pub const ENTER: i32 = 10;
    /// Space.
    pub const SPACE: i32 = 32;
}

/// Code reported when a point hits no key.
pub const NOT_A_KEY: i32 = -1;

/// Maximum number of candidate codes reported for a touch.
pub const MAX_NEARBY_KEYS: usize = 12;

/// A single key.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Left edge in layout coordinates.
    pub x: i32,
    /// Top edge in layout coordinates.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Horizontal gap preceding the key.
    pub gap: i32,
    /// Codes produced by the key; more than one makes it a multi-tap key.
    pub codes: Vec<i32>,
    /// Display label.
    pub label: String,
    /// Literal text emitted instead of a code.
    pub text: Option<String>,
    /// Characters offered by the popup keyboard on long-press.
    pub alternate_characters: Option<String>,
    /// Whether holding the key repeats it.
    pub repeatable: bool,
    pressed: bool,
    hovered: bool,
}

impl Key {
    /// Creates a key with the given codes and no geometry.
    pub fn new(codes: impl Into<Vec<i32>>) -> Self {
        Self {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            gap: 0,
            codes: codes.into(),
            label: String::new(),
            text: None,
            alternate_characters: None,
            repeatable: false,
            pressed: false,
            hovered: false,
        }
    }

    /// Creates a key producing a single character, labelled with it.
    pub fn char(c: char) -> Self {
        Self::new([c as i32]).with_label(c.to_string())
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the literal text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the popup characters.
    pub fn with_alternates(mut self, characters: impl Into<String>) -> Self {
        self.alternate_characters = Some(characters.into());
        self
    }

    /// Sets the key size.
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets the preceding horizontal gap.
    pub fn with_gap(mut self, gap: i32) -> Self {
        self.gap = gap;
        self
    }

    /// Places the key at an explicit position.
    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Marks the key as repeatable.
    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    /// The primary code, or [`NOT_A_KEY`] if the key has no codes.
    pub fn primary_code(&self) -> i32 {
        self.codes.first().copied().unwrap_or(NOT_A_KEY)
    }

    /// Whether the key cycles through several codes.
    pub fn is_multi_tap(&self) -> bool {
        self.codes.len() > 1
    }

    /// Whether long-pressing the key opens a popup keyboard.
    pub fn has_popup(&self) -> bool {
        self.alternate_characters
            .as_deref()
            .is_some_and(|chars| !chars.is_empty())
    }

    /// Whether the point lies inside the key rectangle (right and bottom edges excluded).
    #[inline]
    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Squared distance from the key center to the point.
    #[inline]
    pub fn squared_distance_from(&self, x: i32, y: i32) -> i64 {
        let dx = i64::from(self.x + self.width / 2) - i64::from(x);
        let dy = i64::from(self.y + self.height / 2) - i64::from(y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Center of the key.
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Whether the key is drawn pressed.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether a hover pointer is over the key.
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub(crate) fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub(crate) fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }
}

/// An ordered set of keys with derived geometry.
#[derive(Debug, Clone)]
pub struct Layout {
    keys: Vec<Key>,
    rows: Vec<Range<usize>>,
    columns: usize,
    total_width: i32,
    total_height: i32,
    proximity_threshold: i32,
    disabled: BTreeSet<usize>,
    shifted: bool,
    shift_keys: Vec<usize>,
    enter_key: Option<usize>,
    space_key: Option<usize>,
    mode_change_key: Option<usize>,
}

impl Layout {
    pub(crate) fn from_parts(
        keys: Vec<Key>,
        rows: Vec<Range<usize>>,
        columns: usize,
        total_width: i32,
        total_height: i32,
    ) -> Self {
        let find = |pred: fn(i32) -> bool| keys.iter().position(|k| pred(k.primary_code()));
        let enter_key = find(|code| code == codes::DONE || code == codes::ENTER);
        let space_key = find(|code| code == codes::SPACE);
        let mode_change_key = find(|code| code == codes::MODE_CHANGE);
        let shift_keys = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| k.primary_code() == codes::SHIFT)
            .map(|(i, _)| i)
            .collect();

        let mut layout = Self {
            keys,
            rows,
            columns,
            total_width,
            total_height,
            proximity_threshold: 0,
            disabled: BTreeSet::new(),
            shifted: false,
            shift_keys,
            enter_key,
            space_key,
            mode_change_key,
        };
        layout.compute_proximity_threshold();
        tracing::trace!(
            target: targets::LAYOUT,
            keys = layout.keys.len(),
            width = layout.total_width,
            height = layout.total_height,
            threshold = layout.proximity_threshold,
            "built layout"
        );
        layout
    }

    /// Builds a popup layout from a string of characters, one key per
    /// character, wrapped according to `geometry`.
    pub fn from_characters(characters: &str, geometry: &PopupGeometry) -> Self {
        builder::from_characters(characters, geometry)
    }

    /// Parses a TOML layout description and builds it.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        LayoutSpec::from_toml_str(s)?.build()
    }

    fn compute_proximity_threshold(&mut self) {
        let count = self.keys.len() as i64;
        if count == 0 {
            self.proximity_threshold = 0;
            return;
        }
        let dimension_sum: i64 = self
            .keys
            .iter()
            .map(|k| i64::from(k.width.min(k.height) + k.gap))
            .sum();
        // mean * 1.4, truncated
        let threshold = (dimension_sum * 14 / (10 * count)) as i32;
        self.proximity_threshold = threshold * threshold;
    }

    /// All keys in scan order.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// The key at `index`, if any.
    pub fn key(&self, index: usize) -> Option<&Key> {
        self.keys.get(index)
    }

    pub(crate) fn key_mut(&mut self, index: usize) -> Option<&mut Key> {
        self.keys.get_mut(index)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the layout has no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key index ranges of each row.
    pub fn rows(&self) -> &[Range<usize>] {
        &self.rows
    }

    /// Column count used when the layout was generated.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Total width in pixels.
    pub fn total_width(&self) -> i32 {
        self.total_width
    }

    /// Total height in pixels.
    pub fn total_height(&self) -> i32 {
        self.total_height
    }

    /// Squared distance below which a near-miss still hits a key.
    pub fn proximity_threshold(&self) -> i32 {
        self.proximity_threshold
    }

    /// Finds the key under a point and the nearby candidate codes.
    pub fn locate(&self, x: i32, y: i32, proximity_correction: bool) -> HitResult {
        hit_test::locate(self, x, y, proximity_correction)
    }

    /// Marks the given key indices disabled, replacing any previous set.
    pub fn disable_keys(&mut self, indices: impl IntoIterator<Item = usize>) {
        self.disabled = indices.into_iter().collect();
    }

    /// Whether the key accepts input.
    pub fn is_key_enabled(&self, index: usize) -> bool {
        !self.disabled.contains(&index)
    }

    /// Sets the shift state. Returns whether it changed.
    pub fn set_shifted(&mut self, shifted: bool) -> bool {
        if self.shifted == shifted {
            return false;
        }
        self.shifted = shifted;
        true
    }

    /// Whether the layout is shifted.
    pub fn is_shifted(&self) -> bool {
        self.shifted
    }

    /// Indices of the shift keys.
    pub fn shift_keys(&self) -> &[usize] {
        &self.shift_keys
    }

    /// Index of the enter/done key.
    pub fn enter_key_index(&self) -> Option<usize> {
        self.enter_key
    }

    /// Index of the space key.
    pub fn space_key_index(&self) -> Option<usize> {
        self.space_key
    }

    /// Index of the mode-change key.
    pub fn mode_change_key_index(&self) -> Option<usize> {
        self.mode_change_key
    }

    /// Replaces the enter key label. Returns whether it changed.
    pub fn set_enter_label(&mut self, label: &str) -> bool {
        self.relabel(self.enter_key, label)
    }

    /// Replaces the space key label. Returns whether it changed.
    pub fn set_space_label(&mut self, label: &str) -> bool {
        self.relabel(self.space_key, label)
    }

    /// Replaces the mode-change key label. Returns whether it changed.
    pub fn set_mode_change_label(&mut self, label: &str) -> bool {
        self.relabel(self.mode_change_key, label)
    }

    fn relabel(&mut self, index: Option<usize>, label: &str) -> bool {
        match index.and_then(|i| self.keys.get_mut(i)) {
            Some(key) if key.label != label => {
                key.label = label.to_owned();
                true
            }
            _ => false,
        }
    }

    /// Applies the shift state to a short label.
    pub fn adjust_case(&self, label: &str) -> String {
        let mut chars = label.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if self.shifted && c.is_lowercase() => c.to_uppercase().collect(),
            _ => label.to_owned(),
        }
    }

    /// Fits the layout to a new surface width.
    ///
    /// Rows wider than `new_width` are scaled down horizontally, keeping their
    /// gaps. On error the layout is left untouched.
    pub fn resize(&mut self, new_width: i32) -> Result<()> {
        let _span = PerfSpan::new("layout_resize");
        if self.keys.is_empty() {
            return Err(KeyboardError::InvalidGeometry(
                "cannot resize a layout without keys".into(),
            ));
        }
        if new_width <= 0 {
            return Err(KeyboardError::InvalidGeometry(format!(
                "surface width must be positive, got {new_width}"
            )));
        }

        let mut keys = self.keys.clone();
        for row in &self.rows {
            let row_keys = &mut keys[row.clone()];
            let total_gap: i32 = row_keys.iter().skip(1).map(|k| k.gap).sum();
            let total_width: i32 = row_keys.iter().map(|k| k.width).sum();
            if total_gap + total_width <= new_width {
                continue;
            }
            if total_gap >= new_width {
                return Err(KeyboardError::InvalidGeometry(format!(
                    "row gaps ({total_gap}px) do not fit in {new_width}px"
                )));
            }
            let scale = (new_width - total_gap) as f32 / total_width as f32;
            let mut x = 0;
            for key in row_keys.iter_mut() {
                key.width = (key.width as f32 * scale) as i32;
                key.x = x;
                x += key.width + key.gap;
            }
        }

        self.keys = keys;
        self.total_width = new_width;
        self.compute_proximity_threshold();
        tracing::debug!(target: targets::LAYOUT, new_width, "resized layout");
        Ok(())
    }
}
