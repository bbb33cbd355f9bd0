//! Engine output.
//!
//! Everything the keyboard produces for the text side of the host is a
//! [`KeyboardAction`]. Hosts either connect to the action signal directly,
//! bridge it onto a [`TextInputSink`], or drain it from a channel.

use crate::layout::codes;

/// Direction of a recognized swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Toward negative x.
    Left,
    /// Toward positive x.
    Right,
    /// Toward negative y.
    Up,
    /// Toward positive y.
    Down,
}

/// An event emitted by the keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardAction {
    /// A pointer went down on a key (0 when no key).
    Press {
        /// Primary code of the pressed key.
        code: i32,
    },
    /// A key was released after a commit.
    Release {
        /// The committed code, or [`NOT_A_KEY`](crate::layout::NOT_A_KEY) after text.
        code: i32,
    },
    /// A key was committed.
    KeyCommit {
        /// Resolved code.
        code: i32,
        /// Codes of nearby keys, nearest first.
        candidates: Vec<i32>,
        /// Whether the key has popup characters.
        has_popup: bool,
    },
    /// The previous provisional multi-tap character must be retracted.
    DeleteProvisional,
    /// A multi-tap key advanced its cycle.
    MultiTap {
        /// Index of the key.
        key: usize,
    },
    /// A key was held past the long-press timeout.
    LongPress {
        /// Index of the key.
        key: usize,
        /// Primary code of the key.
        code: i32,
    },
    /// A swipe was recognized.
    Swipe(SwipeDirection),
    /// A commit was attempted with no key under the pointer.
    NoKey,
    /// A literal-text key was committed.
    Text(String),
}

impl KeyboardAction {
    /// Whether the action ends a popup keyboard's purpose.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::KeyCommit { .. } | Self::Text(_) | Self::NoKey
        )
    }
}

/// The receiver of committed text.
pub trait TextInputSink: Send {
    /// Inserts literal text.
    fn commit_text(&mut self, text: &str);

    /// Inserts the character for `code`, or handles a special code.
    fn commit_key(&mut self, code: i32, candidates: &[i32], has_popup: bool);

    /// Removes the last provisional multi-tap character.
    fn delete_provisional(&mut self);

    /// Runs the editor action (submit, go, search).
    fn perform_editor_action(&mut self);
}

/// Delivers an action to a sink. Actions with no sink counterpart are ignored.
pub fn forward_to_sink(action: &KeyboardAction, sink: &mut dyn TextInputSink) {
    match action {
        KeyboardAction::KeyCommit { code, .. } if *code == codes::DONE || *code == codes::ENTER => {
            sink.perform_editor_action();
        }
        KeyboardAction::KeyCommit {
            code,
            candidates,
            has_popup,
        } => sink.commit_key(*code, candidates, *has_popup),
        KeyboardAction::DeleteProvisional => sink.delete_provisional(),
        KeyboardAction::Text(text) => sink.commit_text(text),
        KeyboardAction::Press { .. }
        | KeyboardAction::Release { .. }
        | KeyboardAction::MultiTap { .. }
        | KeyboardAction::LongPress { .. }
        | KeyboardAction::Swipe(_)
        | KeyboardAction::NoKey => {}
    }
}
