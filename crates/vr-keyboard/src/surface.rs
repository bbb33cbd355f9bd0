//! Requests to the host surface.
//!
//! The engine never draws. It tells the host which keys changed and where
//! the preview bubble and popup keyboard go.

use crate::view::PreviewBubble;

/// Which surface a request concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceLayer {
    /// The main keyboard.
    Main,
    /// The popup keyboard.
    Popup,
}

/// What the host should do.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceRequestKind {
    /// Redraw one key.
    InvalidateKey(usize),
    /// Redraw every key.
    InvalidateAll,
    /// Show or move the preview bubble.
    ShowPreview(PreviewBubble),
    /// Hide the preview bubble.
    HidePreview,
    /// A popup keyboard opened at `(x, y)` in main-surface coordinates.
    PopupShown {
        /// Left edge.
        x: i32,
        /// Top edge.
        y: i32,
        /// Width.
        width: i32,
        /// Height.
        height: i32,
    },
    /// The popup keyboard closed.
    PopupDismissed,
}

/// A request addressed to one surface layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceRequest {
    /// Target layer.
    pub layer: SurfaceLayer,
    /// The request.
    pub kind: SurfaceRequestKind,
}

impl SurfaceRequest {
    /// Creates a request.
    pub fn new(layer: SurfaceLayer, kind: SurfaceRequestKind) -> Self {
        Self { layer, kind }
    }
}
