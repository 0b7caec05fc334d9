//! Navigation kernel: first-person look and walk, camera follow, proximity
//! triggers and teleport, driven one tick at a time by [`NavScene`].
//!
//! # Invariants
//! - Per-tick order is fixed: queued commands, look, walk, physics step, camera follow, triggers.
//! - Pitch stays within `[-π/2, π/2]`; yaw is unbounded.
//! - At most one trigger is active; overlaps resolve to the first registered.
//! - Player position is read from the physics body every tick, never cached.

pub mod config;
pub mod event;
pub mod locomotion;
pub mod orientation;
pub mod rig;
pub mod scene;
pub mod teleport;
pub mod triggers;

pub use config::{BodyConfig, ConfigError, SceneConfig};
pub use event::SceneEvent;
pub use locomotion::{LocomotionController, basis, compute_velocity};
pub use orientation::{Orientation, OrientationIntegrator, PITCH_LIMIT};
pub use rig::{Camera, CameraRigSync};
pub use scene::{Hud, NavScene, Prompt, SceneError, TickReport};
pub use teleport::TeleportService;
pub use triggers::{
    ConfirmOutcome, ProximityTriggerSystem, TriggerAction, TriggerListener, TriggerTransition,
    TriggerVolume, evaluate,
};

pub fn crate_info() -> &'static str {
    "walkspace-kernel v0.1.0"
}
