//! Input: host events, buffered movement state, hotkeys, pointer capture.
//!
//! # Invariants
//! - Event handlers only mutate buffered state; nothing here advances the simulation.
//! - Look deltas are read-and-reset exactly once per tick.
//! - A programmatic capture release is never reported as a user exit.

pub mod action;
pub mod bindings;
pub mod capture;
pub mod event;
pub mod state;

pub use action::Action;
pub use bindings::{Hotkey, KeyBindings, MoveDirection};
pub use capture::{
    CaptureError, CaptureRequest, CaptureSignal, CaptureState, HeadlessHost, PointerCaptureController,
    PointerHost,
};
pub use event::InputEvent;
pub use state::InputState;

pub fn crate_info() -> &'static str {
    "walkspace-input v0.1.0"
}
