//! Pointer-capture lifecycle.
//!
//! ```text
//! Free --request--> Requested --granted--> Captured
//!   ^                   |                      |
//!   +------denied-------+<--------lost---------+
//! ```
//!
//! Hosts only grant capture in response to a user gesture. A refused or
//! unanswered request leaves the controller `Free`; the core never retries on
//! its own, the next click does.

use std::collections::VecDeque;
use tracing::{debug, info};

/// The environment side of pointer capture (canvas, window).
pub trait PointerHost {
    /// Ask for exclusive pointer input. Returns `false` when the host refuses
    /// outright; `true` means the request is in flight and the outcome will
    /// arrive later as a capture-change notification.
    fn request_pointer_capture(&mut self) -> bool;

    /// Give the pointer back. The host reports the change asynchronously.
    fn exit_pointer_capture(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Free,
    Requested,
    Captured,
}

/// Immediate result of a capture request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRequest {
    /// The host accepted the request; wait for the change notification.
    Pending,
    /// Already captured, nothing was asked of the host.
    AlreadyCaptured,
    /// The host refused (typically: no user gesture). Still `Free`.
    NotGranted,
}

/// Signals the controller raises toward the owning page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSignal {
    /// Capture ended without the core asking for it (escape, focus loss).
    UserExited,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no host surface to capture the pointer on")]
    NoHostSurface,
}

/// State machine deciding whether the scene owns the pointer.
#[derive(Debug)]
pub struct PointerCaptureController {
    state: CaptureState,
    suppress_auto_exit: bool,
}

impl PointerCaptureController {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Free,
            suppress_auto_exit: false,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_captured(&self) -> bool {
        self.state == CaptureState::Captured
    }

    pub fn suppresses_next_exit(&self) -> bool {
        self.suppress_auto_exit
    }

    /// Ask the host for capture. Must be called from a user gesture.
    pub fn request_capture(
        &mut self,
        host: Option<&mut dyn PointerHost>,
    ) -> Result<CaptureRequest, CaptureError> {
        match self.state {
            CaptureState::Captured => return Ok(CaptureRequest::AlreadyCaptured),
            CaptureState::Requested => return Ok(CaptureRequest::Pending),
            CaptureState::Free => {}
        }
        let host = host.ok_or_else(|| {
            debug!("capture requested before the host surface exists");
            CaptureError::NoHostSurface
        })?;
        if host.request_pointer_capture() {
            self.state = CaptureState::Requested;
            debug!("pointer capture requested");
            Ok(CaptureRequest::Pending)
        } else {
            debug!("pointer capture not granted");
            Ok(CaptureRequest::NotGranted)
        }
    }

    /// Programmatic release (teleport-away, hotkey navigation). The change
    /// notification this causes is not reported as a user exit.
    pub fn release(&mut self, host: &mut dyn PointerHost) {
        if self.state == CaptureState::Free {
            return;
        }
        self.suppress_auto_exit = true;
        host.exit_pointer_capture();
        debug!("pointer capture released programmatically");
    }

    /// Feed a capture-change notification from the host.
    ///
    /// Only a loss of capture spends the suppression flag; a grant that lands
    /// after a programmatic release leaves it armed for the exit that follows.
    pub fn on_capture_changed(&mut self, is_captured: bool) -> Option<CaptureSignal> {
        let prev = self.state;
        if is_captured {
            self.state = CaptureState::Captured;
            if prev != CaptureState::Captured {
                info!(target: "capture", from = ?prev, "pointer captured");
            }
            return None;
        }
        let suppressed = std::mem::take(&mut self.suppress_auto_exit);
        self.state = CaptureState::Free;
        match prev {
            CaptureState::Captured if suppressed => {
                info!(target: "capture", "pointer released by the scene");
                None
            }
            CaptureState::Captured => {
                info!(target: "capture", "pointer released by the user");
                Some(CaptureSignal::UserExited)
            }
            CaptureState::Requested => {
                debug!(target: "capture", "capture request denied by host");
                None
            }
            CaptureState::Free => None,
        }
    }
}

impl Default for PointerCaptureController {
    fn default() -> Self {
        Self::new()
    }
}

/// Host with no real pointer: grants every request and queues the
/// notifications a browser or window system would send back.
///
/// Used by the CLI simulator and by tests.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    /// When `true`, requests are refused as if no user gesture was present.
    pub refuse: bool,
    pub requests: u32,
    pub exits: u32,
    pending: VecDeque<bool>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the capture-change notifications the host would deliver.
    pub fn take_notifications(&mut self) -> Vec<bool> {
        self.pending.drain(..).collect()
    }

    /// Simulate the user pressing Escape while captured.
    pub fn user_escape(&mut self) {
        self.pending.push_back(false);
    }
}

impl PointerHost for HeadlessHost {
    fn request_pointer_capture(&mut self) -> bool {
        self.requests += 1;
        if self.refuse {
            return false;
        }
        self.pending.push_back(true);
        true
    }

    fn exit_pointer_capture(&mut self) {
        self.exits += 1;
        self.pending.push_back(false);
    }
}
