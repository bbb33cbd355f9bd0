//! Declarative layout descriptions.
//!
//! A layout can be described as data and deserialized with `serde`:
//!
//! ```toml
//! key_width = 40
//! key_height = 50
//! horizontal_gap = 4
//!
//! [[rows]]
//! keys = [
//!     { label = "a", alternates = "àáâ" },
//!     { label = "b" },
//!     { codes = [-5], label = "del", repeatable = true, width = 80 },
//! ]
//! ```

use serde::{Deserialize, Serialize};

use super::{Key, Layout, LayoutBuilder};
use crate::error::{KeyboardError, Result};

/// A whole layout: default key geometry and rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Default key width.
    pub key_width: i32,
    /// Default key height.
    pub key_height: i32,
    /// Default gap before each key.
    #[serde(default)]
    pub horizontal_gap: i32,
    /// Gap between rows.
    #[serde(default)]
    pub vertical_gap: i32,
    /// Rows from top to bottom.
    #[serde(default)]
    pub rows: Vec<RowSpec>,
}

/// One row of keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSpec {
    /// Keys from left to right.
    pub keys: Vec<KeySpec>,
    /// Overrides the default key height for this row.
    #[serde(default)]
    pub key_height: Option<i32>,
}

/// One key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySpec {
    /// Codes; derived from the first character of the label when empty.
    pub codes: Vec<i32>,
    /// Display label.
    pub label: String,
    /// Literal text emitted instead of a code.
    pub text: Option<String>,
    /// Popup characters.
    pub alternates: Option<String>,
    /// Whether the key repeats while held.
    pub repeatable: bool,
    /// Width override.
    pub width: Option<i32>,
    /// Gap override.
    pub gap: Option<i32>,
}

impl KeySpec {
    fn to_key(&self, row: usize, index: usize, default_height: i32) -> Result<Key> {
        let codes = if self.codes.is_empty() {
            let first = self
                .label
                .chars()
                .next()
                .ok_or(KeyboardError::EmptyCodes { row, index })?;
            vec![first as i32]
        } else {
            self.codes.clone()
        };

        let mut key = Key::new(codes).with_label(self.label.clone());
        key.text = self.text.clone();
        key.alternate_characters = self.alternates.clone();
        key.repeatable = self.repeatable;
        key.height = default_height;
        if let Some(width) = self.width {
            key.width = width;
        }
        if let Some(gap) = self.gap {
            key.gap = gap;
        }
        Ok(key)
    }
}

impl LayoutSpec {
    /// Parses a TOML layout description.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|source| KeyboardError::Parse {
            what: "layout description",
            source,
        })
    }

    /// Builds the described layout.
    pub fn build(&self) -> Result<Layout> {
        let mut builder = LayoutBuilder::new()
            .key_size(self.key_width, self.key_height)
            .horizontal_gap(self.horizontal_gap)
            .vertical_gap(self.vertical_gap);

        for (row_index, row) in self.rows.iter().enumerate() {
            let height = row.key_height.unwrap_or(self.key_height);
            let keys = row
                .keys
                .iter()
                .enumerate()
                .map(|(index, spec)| spec.to_key(row_index, index, height))
                .collect::<Result<Vec<_>>>()?;
            builder = builder.row(keys);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::codes;

    const QWE: &str = r#"
        key_width = 40
        key_height = 50
        horizontal_gap = 4

        [[rows]]
        keys = [
            { label = "q" },
            { label = "w", alternates = "ŵ" },
            { codes = [-5], label = "del", repeatable = true, width = 80 },
        ]

        [[rows]]
        key_height = 30
        keys = [{ label = ".com", text = ".com", codes = [-14] }]
    "#;

    #[test]
    fn test_parse_and_build() {
        let layout = Layout::from_toml_str(QWE).unwrap();
        assert_eq!(layout.len(), 4);

        let keys = layout.keys();
        assert_eq!(keys[0].codes, vec!['q' as i32]);
        assert!(keys[1].has_popup());
        assert_eq!(keys[2].primary_code(), codes::DELETE);
        assert!(keys[2].repeatable);
        assert_eq!((keys[2].x, keys[2].width), (92, 80));
        assert_eq!(keys[3].text.as_deref(), Some(".com"));
        assert_eq!((keys[3].y, keys[3].height), (50, 30));
    }

    #[test]
    fn test_key_without_codes_or_label() {
        let err = Layout::from_toml_str(
            r#"
            key_width = 40
            key_height = 40
            [[rows]]
            keys = [{ label = "a" }, { repeatable = true }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, KeyboardError::EmptyCodes { row: 0, index: 1 }));
    }

    #[test]
    fn test_malformed_layout() {
        let err = LayoutSpec::from_toml_str("key_width = \"wide\"").unwrap_err();
        assert!(matches!(
            err,
            KeyboardError::Parse {
                what: "layout description",
                ..
            }
        ));
    }
}
