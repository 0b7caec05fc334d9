//! Proximity triggers.
//!
//! Volumes are spheres registered once at scene setup. Each tick the player
//! position is tested against them and only *changes* of the active volume
//! are reported: one enter, one exit, nothing while standing inside.
//!
//! Overlapping volumes resolve to the one registered first. There is no
//! hysteresis band, so jittering exactly on a boundary re-fires enter/exit on
//! every crossing.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkspace_common::TriggerId;

/// What confirming a trigger's prompt does. Supplied by the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriggerAction {
    /// Move the player elsewhere in this scene.
    Teleport { target: Vec3 },
    /// Leave the scene for another route.
    Navigate { route: String },
    /// Surface a page panel (upload form, about text).
    OpenPanel { panel: String },
}

/// Named spherical region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerVolume {
    pub id: TriggerId,
    pub center: Vec3,
    pub radius: f32,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub action: Option<TriggerAction>,
}

impl TriggerVolume {
    pub fn new(id: impl Into<String>, center: Vec3, radius: f32) -> Self {
        Self {
            id: TriggerId::new(id),
            center,
            radius,
            prompt: String::new(),
            action: None,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_action(mut self, action: TriggerAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Strictly inside; a point exactly on the surface is outside.
    pub fn contains(&self, position: Vec3) -> bool {
        position.distance(self.center) < self.radius
    }
}

/// Receives edge transitions. The UI shows a prompt on enter and hides it
/// on exit.
pub trait TriggerListener {
    fn on_enter(&mut self, volume: &TriggerVolume);
    fn on_exit(&mut self, volume: &TriggerVolume);
}

/// What changed during one update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TriggerTransition {
    pub exited: Option<TriggerId>,
    pub entered: Option<TriggerId>,
}

impl TriggerTransition {
    pub fn is_empty(&self) -> bool {
        self.exited.is_none() && self.entered.is_none()
    }
}

/// Result of the UI confirming a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// Carry out this action.
    Invoke(TriggerAction),
    /// The trigger is not the active one; nothing is on offer.
    NotOffered,
    /// Active, but no action was registered for it.
    Unbound,
}

/// First volume, in registration order, containing `position`.
pub fn evaluate(position: Vec3, volumes: &[TriggerVolume]) -> Option<&TriggerId> {
    volumes.iter().find(|v| v.contains(position)).map(|v| &v.id)
}

/// Registry plus the single "which volume is the player in" field.
#[derive(Debug, Clone, Default)]
pub struct ProximityTriggerSystem {
    volumes: Vec<TriggerVolume>,
    active: Option<TriggerId>,
}

impl ProximityTriggerSystem {
    pub fn new(volumes: Vec<TriggerVolume>) -> Self {
        Self {
            volumes,
            active: None,
        }
    }

    /// Append a volume. Registration order is the overlap tie-break.
    pub fn register(&mut self, volume: TriggerVolume) {
        self.volumes.push(volume);
    }

    pub fn volumes(&self) -> &[TriggerVolume] {
        &self.volumes
    }

    pub fn get(&self, id: &TriggerId) -> Option<&TriggerVolume> {
        self.volumes.iter().find(|v| &v.id == id)
    }

    pub fn active(&self) -> Option<&TriggerId> {
        self.active.as_ref()
    }

    /// Re-evaluate against a fresh position and fire exit-then-enter when
    /// the active volume changed.
    pub fn update(&mut self, position: Vec3, listener: &mut dyn TriggerListener) -> TriggerTransition {
        let next = evaluate(position, &self.volumes).cloned();
        if next == self.active {
            return TriggerTransition::default();
        }
        let mut transition = TriggerTransition::default();
        if let Some(old) = self.active.take() {
            if let Some(v) = self.get(&old) {
                debug!(trigger = %old, "trigger exit");
                listener.on_exit(v);
            }
            transition.exited = Some(old);
        }
        if let Some(new) = &next {
            if let Some(v) = self.get(new) {
                debug!(trigger = %new, "trigger enter");
                listener.on_enter(v);
            }
            transition.entered = Some(new.clone());
        }
        self.active = next;
        transition
    }

    /// The UI confirmed `id`'s prompt. Only the active trigger is on offer.
    pub fn confirm_action(&self, id: &TriggerId) -> ConfirmOutcome {
        if self.active.as_ref() != Some(id) {
            warn!(trigger = %id, "confirm for a trigger that is not active");
            return ConfirmOutcome::NotOffered;
        }
        match self.get(id).and_then(|v| v.action.clone()) {
            Some(action) => ConfirmOutcome::Invoke(action),
            None => {
                warn!(trigger = %id, "no action registered for trigger");
                ConfirmOutcome::Unbound
            }
        }
    }

    /// Forget the active volume without firing callbacks (scene reset).
    pub fn clear_active(&mut self) {
        self.active = None;
    }
}
