/// A raw event delivered by the host surface.
///
/// Key codes are physical key names (`KeyW`, `ArrowUp`, `Digit1`, `Escape`),
/// the same names the browser's `KeyboardEvent.code` and winit's `KeyCode`
/// use, so bindings work unchanged on either host.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A physical key changed state.
    Key { code: String, down: bool },
    /// Relative pointer motion in device counts.
    Mouse { dx: f32, dy: f32 },
    /// The host gained or lost exclusive pointer capture, for any reason.
    CaptureChange { is_captured: bool },
    /// The window lost focus; held keys will never see their key-up.
    FocusLost,
}

impl InputEvent {
    pub fn key_down(code: impl Into<String>) -> Self {
        Self::Key {
            code: code.into(),
            down: true,
        }
    }

    pub fn key_up(code: impl Into<String>) -> Self {
        Self::Key {
            code: code.into(),
            down: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_helpers_build_tagged_variants() {
        assert_eq!(
            InputEvent::key_down("KeyW"),
            InputEvent::Key {
                code: "KeyW".into(),
                down: true
            }
        );
        assert!(matches!(InputEvent::key_up("KeyW"), InputEvent::Key { down: false, .. }));
    }
}
