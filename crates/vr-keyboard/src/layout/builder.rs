//! Layout construction.

use super::{Key, Layout};
use crate::error::{KeyboardError, Result};

/// Builds a [`Layout`] row by row.
///
/// Keys are placed left to right; each key is preceded by its gap. Keys
/// without an explicit size or gap take the builder's defaults.
#[derive(Debug, Clone, Default)]
pub struct LayoutBuilder {
    key_width: i32,
    key_height: i32,
    horizontal_gap: i32,
    vertical_gap: i32,
    rows: Vec<Vec<Key>>,
}

impl LayoutBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default key size.
    pub fn key_size(mut self, width: i32, height: i32) -> Self {
        self.key_width = width;
        self.key_height = height;
        self
    }

    /// Sets the default gap before each key.
    pub fn horizontal_gap(mut self, gap: i32) -> Self {
        self.horizontal_gap = gap;
        self
    }

    /// Sets the gap between rows.
    pub fn vertical_gap(mut self, gap: i32) -> Self {
        self.vertical_gap = gap;
        self
    }

    /// Appends a row of keys.
    pub fn row(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.rows.push(keys.into_iter().collect());
        self
    }

    /// Places the keys and builds the layout.
    ///
    /// Fails if a key has no codes.
    pub fn build(self) -> Result<Layout> {
        let mut keys = Vec::new();
        let mut ranges = Vec::with_capacity(self.rows.len());
        let mut columns = 0;
        let mut total_width = 0;
        let mut y = 0;

        for (row_index, row) in self.rows.into_iter().enumerate() {
            let start = keys.len();
            let mut x = 0;
            let mut row_height = 0;
            columns = columns.max(row.len());

            for (index, mut key) in row.into_iter().enumerate() {
                if key.codes.is_empty() {
                    return Err(KeyboardError::EmptyCodes {
                        row: row_index,
                        index,
                    });
                }
                if key.width == 0 {
                    key.width = self.key_width;
                }
                if key.height == 0 {
                    key.height = self.key_height;
                }
                if key.gap == 0 {
                    key.gap = self.horizontal_gap;
                }
                x += key.gap;
                key.x = x;
                key.y = y;
                x += key.width;
                row_height = row_height.max(key.height);
                keys.push(key);
            }

            total_width = total_width.max(x);
            y += row_height + self.vertical_gap;
            ranges.push(start..keys.len());
        }

        let total_height = if ranges.is_empty() {
            0
        } else {
            y - self.vertical_gap
        };
        Ok(Layout::from_parts(
            keys,
            ranges,
            columns,
            total_width,
            total_height,
        ))
    }
}

/// Geometry for a layout generated from a string of characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupGeometry {
    /// Width of each key.
    pub key_width: i32,
    /// Height of each key.
    pub key_height: i32,
    /// Gap after each key.
    pub horizontal_gap: i32,
    /// Gap between rows.
    pub vertical_gap: i32,
    /// Maximum keys per row.
    pub columns: usize,
    /// Padding reserved at the right edge.
    pub horizontal_padding: i32,
    /// Width available for the layout.
    pub display_width: i32,
}

/// Lays out one single-code key per character, left to right and top to
/// bottom. A new row starts when the current one holds `columns` keys or the
/// next key would not fit in the display width.
pub(super) fn from_characters(characters: &str, geometry: &PopupGeometry) -> Layout {
    let mut keys = Vec::new();
    let mut rows = Vec::new();
    let mut row_start = 0;
    let mut x = 0;
    let mut y = 0;
    let mut column = 0;
    let mut total_width = 0;

    for c in characters.chars() {
        let overflows =
            x + geometry.key_width + geometry.horizontal_padding > geometry.display_width;
        if column > 0 && (column >= geometry.columns || overflows) {
            rows.push(row_start..keys.len());
            row_start = keys.len();
            x = 0;
            y += geometry.vertical_gap + geometry.key_height;
            column = 0;
        }

        let key = Key::char(c)
            .with_size(geometry.key_width, geometry.key_height)
            .with_gap(geometry.horizontal_gap)
            .at(x, y);
        keys.push(key);
        column += 1;
        x += geometry.key_width + geometry.horizontal_gap;
        total_width = total_width.max(x);
    }

    let total_height = if keys.is_empty() {
        0
    } else {
        rows.push(row_start..keys.len());
        y + geometry.key_height
    };
    Layout::from_parts(keys, rows, geometry.columns, total_width, total_height)
}
