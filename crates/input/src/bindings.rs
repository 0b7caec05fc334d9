use serde::{Deserialize, Serialize};

use crate::action::Action;

/// One of the four horizontal movement intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// A key code bound to a one-shot action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotkey {
    pub code: String,
    pub action: Action,
}

impl Hotkey {
    pub fn new(code: impl Into<String>, action: Action) -> Self {
        Self {
            code: code.into(),
            action,
        }
    }
}

/// Key mapping configuration.
///
/// Several codes may drive the same direction (`KeyW` and `ArrowUp`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: Vec<String>,
    pub backward: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub hotkeys: Vec<Hotkey>,
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: codes(&["KeyW", "ArrowUp"]),
            backward: codes(&["KeyS", "ArrowDown"]),
            left: codes(&["KeyA", "ArrowLeft"]),
            right: codes(&["KeyD", "ArrowRight"]),
            hotkeys: vec![
                Hotkey::new("KeyH", Action::ShowHelp),
                Hotkey::new("KeyX", Action::HideHelp),
                Hotkey::new("Digit1", Action::Navigate { route: "/".into() }),
                Hotkey::new(
                    "Digit2",
                    Action::Navigate {
                        route: "/audio-recorder".into(),
                    },
                ),
                Hotkey::new(
                    "Digit3",
                    Action::Navigate {
                        route: "/about".into(),
                    },
                ),
                Hotkey::new("KeyR", Action::Respawn),
                Hotkey::new("KeyY", Action::Confirm),
                Hotkey::new("Enter", Action::Confirm),
                Hotkey::new("KeyN", Action::Decline),
            ],
        }
    }
}

impl KeyBindings {
    /// Movement direction driven by `code`, if any.
    pub fn direction(&self, code: &str) -> Option<MoveDirection> {
        let hit = |list: &[String]| list.iter().any(|c| c == code);
        if hit(&self.forward) {
            Some(MoveDirection::Forward)
        } else if hit(&self.backward) {
            Some(MoveDirection::Backward)
        } else if hit(&self.left) {
            Some(MoveDirection::Left)
        } else if hit(&self.right) {
            Some(MoveDirection::Right)
        } else {
            None
        }
    }

    /// First hotkey bound to `code`.
    pub fn hotkey(&self, code: &str) -> Option<&Action> {
        self.hotkeys
            .iter()
            .find(|h| h.code == code)
            .map(|h| &h.action)
    }

    /// Codes bound to the given direction.
    pub fn codes_for(&self, dir: MoveDirection) -> &[String] {
        match dir {
            MoveDirection::Forward => &self.forward,
            MoveDirection::Backward => &self.backward,
            MoveDirection::Left => &self.left,
            MoveDirection::Right => &self.right,
        }
    }
}
