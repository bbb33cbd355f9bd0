//! Pointer input processing.
//!
//! The pieces the keyboard view's state machine is assembled from:
//!
//! - [`hit_test`]: point to key, with proximity correction
//! - [`swipe`]: velocity tracking and swipe classification
//! - [`multitap`]: cycling through the codes of a re-struck key
//! - [`hover`]: per-device hover state
//! - `touch`: conversion from winit touch events (feature `winit`)

pub mod hover;
pub mod multitap;
pub mod swipe;
#[cfg(feature = "winit")]
pub mod touch;

pub use hit_test::{HitResult, locate};
pub use hover::{HoverChange, HoverTracker};
pub use multitap::MultiTapState;
pub use swipe::{SwipeClassifier, SwipeOutcome, SwipeTracker};
#[cfg(feature = "winit")]
pub use touch::{TouchAdapter, from_winit_touch_phase};
