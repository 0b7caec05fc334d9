//! Developer tooling: read-only scene inspection.
//!
//! # Invariants
//! - Tools never mutate a scene.

mod inspector;

pub use inspector::{SceneInspector, SceneSummary, TriggerInfo};

pub fn crate_info() -> &'static str {
    "walkspace-tools v0.1.0"
}
