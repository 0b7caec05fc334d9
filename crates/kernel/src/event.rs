use glam::Vec3;
use serde::Serialize;
use walkspace_common::TriggerId;

use crate::triggers::TriggerAction;

/// Something the page may want to react to, recorded during a tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SceneEvent {
    TriggerEntered { id: TriggerId, prompt: String },
    TriggerExited { id: TriggerId },
    PromptDeclined { id: TriggerId },
    ActionConfirmed { id: TriggerId, action: TriggerAction },
    ConfirmIgnored { id: Option<TriggerId>, reason: String },
    PanelOpened { panel: String },
    PanelClosed { panel: String },
    Teleported { from: Vec3, to: Vec3 },
    /// The page should route to `route`. Capture was released on purpose.
    NavigationRequested { route: String },
    /// The user left pointer capture themselves; the page routes home.
    UserExited,
    HelpToggled { visible: bool },
}
