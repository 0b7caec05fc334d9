use std::collections::VecDeque;
use std::sync::Arc;
use walkspace_input::PointerHost;
use winit::window::{CursorGrabMode, Window};

/// Cursor grab on a winit window, reported back the way a browser reports
/// pointer-lock changes: asynchronously, through [`DesktopHost::take_notifications`].
#[derive(Default)]
pub struct DesktopHost {
    window: Option<Arc<Window>>,
    pending: VecDeque<bool>,
    grabbed: bool,
}

impl DesktopHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, window: Arc<Window>) {
        self.window = Some(window);
    }

    pub fn has_surface(&self) -> bool {
        self.window.is_some()
    }

    pub fn take_notifications(&mut self) -> Vec<bool> {
        self.pending.drain(..).collect()
    }

    /// The window system took the grab away (Escape, focus loss).
    pub fn lost_by_user(&mut self) {
        if !self.grabbed {
            return;
        }
        self.ungrab();
        self.pending.push_back(false);
    }

    fn ungrab(&mut self) {
        if let Some(window) = &self.window {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
        self.grabbed = false;
    }
}

impl PointerHost for DesktopHost {
    fn request_pointer_capture(&mut self) -> bool {
        let Some(window) = &self.window else {
            return false;
        };
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                window.set_cursor_visible(false);
                self.grabbed = true;
                self.pending.push_back(true);
                true
            }
            Err(e) => {
                tracing::warn!("cursor grab refused: {e}");
                false
            }
        }
    }

    fn exit_pointer_capture(&mut self) {
        self.ungrab();
        self.pending.push_back(false);
    }
}
