use glam::Vec3;
use serde::{Deserialize, Serialize};

/// A high-level action a hotkey can produce.
///
/// Hotkey presses are queued as actions and executed during the next tick,
/// never from inside the key handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Show the controls help popup.
    ShowHelp,
    /// Hide the controls help popup.
    HideHelp,
    /// Release the pointer and ask the page to route elsewhere.
    Navigate { route: String },
    /// Jump the player to a fixed point.
    Teleport { target: Vec3 },
    /// Jump the player back to the scene's spawn point.
    Respawn,
    /// Accept the prompt of the trigger the player is standing in.
    Confirm,
    /// Dismiss the current prompt until the player re-enters the volume.
    Decline,
    /// Bound but intentionally inert.
    Noop,
}
