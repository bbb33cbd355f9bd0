//! Core systems for the VR soft keyboard.
//!
//! This crate provides the foundational pieces the input engine is built on:
//!
//! - **Timers**: a logical-clock queue of one-shot and repeating timers
//! - **Signal/Slot System**: the single channel the engine emits through
//! - **Pointer Events**: contact and hover events delivered by the host
//! - **Logging**: `tracing` targets for filtering by subsystem
//!
//! # Timer Example
//!
//! ```
//! use vr_keyboard_core::TimerQueue;
//!
//! let mut timers = TimerQueue::new();
//! timers.start_one_shot(0, 400, "long-press");
//!
//! assert!(timers.pop_expired(399).is_none());
//! assert_eq!(timers.pop_expired(400).unwrap().payload, "long-press");
//! ```
//!
//! # Signal Example
//!
//! ```
//! use vr_keyboard_core::Signal;
//!
//! let pressed = Signal::<i32>::new();
//! pressed.connect(|code| println!("pressed {code}"));
//! pressed.emit(97);
//! ```

mod error;
mod event;
pub mod logging;
pub mod signal;
mod timer;

pub use error::{CoreError, Result, SignalError, TimerError};
pub use event::{DeviceId, HoverAction, HoverEvent, PointerAction, PointerEvent};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
pub use timer::{FiredTimer, Millis, TimerId, TimerKind, TimerQueue};
