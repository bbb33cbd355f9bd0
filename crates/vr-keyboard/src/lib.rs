//! VR Keyboard - the soft keyboard input engine of a VR browser.
//!
//! Turns raw pointer and hover events from a 3D overlay surface into
//! committed characters. Handles imprecise touch geometry with proximity
//! correction, timed gestures (long-press, multi-tap, key repeat, swipe) and
//! popup keyboards for accented and alternate characters.
//!
//! The engine never draws and never owns a clock. The host delivers events
//! with logical timestamps, calls [`Keyboard::tick`] between events, and
//! receives [`KeyboardAction`]s and [`SurfaceRequest`]s on signals.
//!
//! # Example
//!
//! ```
//! use vr_keyboard::prelude::*;
//!
//! let layout = Layout::from_toml_str(r#"
//!     key_width = 40
//!     key_height = 40
//!
//!     [[rows]]
//!     keys = [{ label = "a", alternates = "áàâ" }, { label = "b" }]
//! "#).unwrap();
//!
//! let keyboard = Keyboard::new(layout, KeyboardConfig::default()).unwrap();
//! let (_, actions) = keyboard.action_channel();
//!
//! keyboard.on_pointer_event(PointerEvent::down(60.0, 20.0, 0));
//! keyboard.on_pointer_event(PointerEvent::up(60.0, 20.0, 50));
//!
//! let committed: Vec<_> = actions.try_iter().collect();
//! assert!(committed.contains(&KeyboardAction::KeyCommit {
//!     code: 'b' as i32,
//!     candidates: vec!['b' as i32],
//!     has_popup: false,
//! }));
//! ```

pub mod action;
pub mod config;
pub mod error;
pub mod input;
pub mod keyboard;
pub mod layout;
pub mod popup;
pub mod prelude;
pub mod surface;
pub mod view;

pub use action::{KeyboardAction, SwipeDirection, TextInputSink, forward_to_sink};
pub use config::{KeyboardConfig, PopupConfig, PreviewConfig, TimingConfig};
pub use error::{KeyboardError, Result};
pub use keyboard::Keyboard;
pub use layout::{Key, KeyboardVariant, Layout, LayoutBuilder, LayoutSet, LayoutSpec, NOT_A_KEY};
pub use popup::PopupKeyboard;
pub use surface::{SurfaceLayer, SurfaceRequest, SurfaceRequestKind};
pub use view::{KeyboardView, PointerSession, PreviewBubble, TouchState};
