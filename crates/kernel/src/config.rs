//! Scene configuration loaded from YAML.
//!
//! Every field has a default; an empty document yields the home scene.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkspace_common::TriggerId;
use walkspace_input::KeyBindings;
use walkspace_physics::BodyDesc;

use crate::triggers::{TriggerAction, TriggerVolume};

/// Errors from loading or validating a [`SceneConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("duplicate trigger id {0}")]
    DuplicateTrigger(TriggerId),
}

/// Player collider parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub mass: f32,
    pub radius: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub name: String,
    pub spawn: Vec3,
    pub spawn_yaw: f32,
    pub body: BodyConfig,
    pub eye_height: f32,
    /// Fraction of the camera-to-eye gap closed per tick, in (0, 1].
    /// The default 1 keeps the camera on the body each tick; lower values
    /// smooth the view but let it lag more than a tick behind while walking.
    pub camera_smoothing: f32,
    /// Horizontal speed in units per second.
    pub move_speed: f32,
    /// Radians per pixel of mouse motion.
    pub look_sensitivity: f32,
    pub fov_degrees: f32,
    pub bindings: KeyBindings,
    pub triggers: Vec<TriggerVolume>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let spawn = Vec3::new(-3.0, 0.5, 3.0);
        Self {
            name: "home".to_string(),
            spawn,
            spawn_yaw: 0.0,
            body: BodyConfig::default(),
            eye_height: 1.0,
            camera_smoothing: 1.0,
            move_speed: 6.0,
            look_sensitivity: 0.002,
            fov_degrees: 45.0,
            bindings: KeyBindings::default(),
            triggers: home_triggers(spawn),
        }
    }
}

/// Home room and the info area floating above it, reached by portal.
fn home_triggers(spawn: Vec3) -> Vec<TriggerVolume> {
    vec![
        TriggerVolume::new("recognizer", Vec3::new(0.0, 0.5, 0.0), 1.5)
            .with_prompt("Upload an image to recognize?")
            .with_action(TriggerAction::OpenPanel {
                panel: "upload".into(),
            }),
        TriggerVolume::new("audio_booth", Vec3::new(6.0, 0.5, 0.0), 1.5)
            .with_prompt("Open the audio recorder?")
            .with_action(TriggerAction::Navigate {
                route: "/audio-recorder".into(),
            }),
        TriggerVolume::new("info_portal", Vec3::new(0.0, 0.5, -8.0), 2.0)
            .with_prompt("Step through to the info area?")
            .with_action(TriggerAction::Teleport {
                target: Vec3::new(0.0, 0.5, 200.0),
            }),
        TriggerVolume::new("about", Vec3::new(-3.0, 0.5, 205.0), 2.0)
            .with_prompt("Read about this project?")
            .with_action(TriggerAction::OpenPanel {
                panel: "about".into(),
            }),
        TriggerVolume::new("credits", Vec3::new(3.0, 0.5, 205.0), 2.0)
            .with_prompt("Show credits?")
            .with_action(TriggerAction::OpenPanel {
                panel: "credits".into(),
            }),
        TriggerVolume::new("return_portal", Vec3::new(0.0, 0.5, 205.0), 1.0)
            .with_prompt("Return home?")
            .with_action(TriggerAction::Teleport { target: spawn }),
    ]
}

impl SceneConfig {
    /// Parse and validate.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("body.mass", self.body.mass)?;
        positive("body.radius", self.body.radius)?;
        positive("move_speed", self.move_speed)?;
        positive("look_sensitivity", self.look_sensitivity)?;
        positive("fov_degrees", self.fov_degrees)?;
        if !(self.eye_height >= 0.0) {
            return Err(invalid("eye_height", "must be zero or greater"));
        }
        if !(self.camera_smoothing > 0.0 && self.camera_smoothing <= 1.0) {
            return Err(invalid("camera_smoothing", "must be in (0, 1]"));
        }
        if !self.spawn.is_finite() {
            return Err(invalid("spawn", "must be finite"));
        }

        let mut seen = BTreeSet::new();
        for t in &self.triggers {
            positive(&format!("triggers.{}.radius", t.id), t.radius)?;
            if !seen.insert(&t.id) {
                return Err(ConfigError::DuplicateTrigger(t.id.clone()));
            }
        }
        Ok(())
    }

    /// Pairs of triggers whose spheres intersect. Legal, but the later one
    /// is shadowed wherever they overlap.
    pub fn overlapping_triggers(&self) -> Vec<(TriggerId, TriggerId)> {
        let mut out = Vec::new();
        for (i, a) in self.triggers.iter().enumerate() {
            for b in &self.triggers[i + 1..] {
                if a.center.distance(b.center) < a.radius + b.radius {
                    out.push((a.id.clone(), b.id.clone()));
                }
            }
        }
        out
    }

    pub fn body_desc(&self) -> BodyDesc {
        BodyDesc {
            mass: self.body.mass,
            position: self.spawn,
            radius: self.body.radius,
            fixed_rotation: true,
        }
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidField {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// Written as a negated comparison so NaN is rejected too.
fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if !(value > 0.0) {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_the_home_scene() {
        let c = SceneConfig::default();
        assert_eq!(c.spawn + Vec3::new(0.0, c.eye_height, 0.0), Vec3::new(-3.0, 1.5, 3.0));
        assert_eq!(c.fov_degrees, 45.0);
        assert_eq!(c.triggers.len(), 6);
        c.validate().unwrap();
        assert!(c.overlapping_triggers().is_empty());
    }

    #[test]
    fn empty_document_gives_defaults() {
        let c = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(c, SceneConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let yaml = r#"
name: gallery
move_speed: 3.5
spawn: [1.0, 0.5, 1.0]
body:
  radius: 0.25
triggers:
  - id: door
    center: [0.0, 0.5, 4.0]
    radius: 1.0
    prompt: "Leave?"
    action:
      kind: navigate
      route: /
"#;
        let c = SceneConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(c.name, "gallery");
        assert_eq!(c.move_speed, 3.5);
        assert_eq!(c.body.radius, 0.25);
        assert_eq!(c.body.mass, 1.0);
        assert_eq!(c.triggers.len(), 1);
        assert_eq!(c.body_desc().position, Vec3::new(1.0, 0.5, 1.0));
        assert!(c.body_desc().fixed_rotation);
    }

    #[test]
    fn rejects_bad_values() {
        let cases = [
            "move_speed: 0.0",
            "move_speed: -2.0",
            "body: { radius: 0.0 }",
            "camera_smoothing: 0.0",
            "camera_smoothing: 1.5",
            "triggers: [{ id: a, center: [0, 0, 0], radius: -1.0 }]",
        ];
        for yaml in cases {
            let err = SceneConfig::from_yaml_str(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidField { .. }), "{yaml}: {err}");
        }
    }

    #[test]
    fn rejects_duplicate_trigger_ids() {
        let yaml = "triggers:\n  - { id: a, center: [0, 0, 0], radius: 1.0 }\n  - { id: a, center: [9, 0, 0], radius: 1.0 }\n";
        let err = SceneConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTrigger(id) if id.as_str() == "a"));
    }

    #[test]
    fn reports_overlaps_in_registration_order() {
        let mut c = SceneConfig::default();
        c.triggers = vec![
            TriggerVolume::new("a", Vec3::ZERO, 2.0),
            TriggerVolume::new("b", Vec3::new(3.0, 0.0, 0.0), 2.0),
            TriggerVolume::new("c", Vec3::new(20.0, 0.0, 0.0), 2.0),
        ];
        assert_eq!(c.overlapping_triggers(), vec![(TriggerId::new("a"), TriggerId::new("b"))]);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name: from-disk\neye_height: 1.2").unwrap();
        let c = SceneConfig::load(file.path()).unwrap();
        assert_eq!(c.name, "from-disk");
        assert_eq!(c.eye_height, 1.2);
    }

    #[test]
    fn load_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yaml");
        let err = SceneConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn yaml_round_trip_preserves_config() {
        let c = SceneConfig::default();
        let yaml = c.to_yaml().unwrap();
        assert_eq!(SceneConfig::from_yaml_str(&yaml).unwrap(), c);
    }
}
