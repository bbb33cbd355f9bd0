//! Prelude module for the VR keyboard.
//!
//! ```ignore
//! use vr_keyboard::prelude::*;
//! ```

// ============================================================================
// Controller and Output
// ============================================================================

pub use crate::Keyboard;
pub use crate::action::{KeyboardAction, SwipeDirection, TextInputSink};
pub use crate::surface::{SurfaceLayer, SurfaceRequest, SurfaceRequestKind};

// ============================================================================
// Layouts
// ============================================================================

pub use crate::layout::{Key, KeyboardVariant, Layout, LayoutBuilder, LayoutSet, codes};

// ============================================================================
// Configuration and Errors
// ============================================================================

pub use crate::config::KeyboardConfig;
pub use crate::error::{KeyboardError, Result};

// ============================================================================
// Events and Signals
// ============================================================================

pub use vr_keyboard_core::{
    DeviceId, HoverAction, HoverEvent, Millis, PointerAction, PointerEvent, Signal,
};
