use glam::Vec3;
use serde::Serialize;
use walkspace_common::{SceneId, TriggerId, horizontal};
use walkspace_kernel::NavScene;

/// Read-only queries against a scene, for HUD overlays and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &NavScene) -> SceneSummary {
        let o = scene.orientation();
        SceneSummary {
            id: scene.id(),
            name: scene.config().name.clone(),
            tick: scene.ticks(),
            ready: scene.is_ready(),
            captured: scene.is_captured(),
            position: scene.position(),
            ground_speed: scene
                .body()
                .map_or(0.0, |b| horizontal(b.borrow().velocity()).length()),
            camera: scene.camera().position,
            yaw_degrees: o.wrapped_yaw().to_degrees(),
            pitch_degrees: o.pitch.to_degrees(),
            active_trigger: scene.active_trigger().cloned(),
            trigger_count: scene.triggers().volumes().len(),
            pending_events: scene.events().len(),
        }
    }

    /// Every trigger with its distance from the player, nearest first.
    pub fn triggers_by_distance(scene: &NavScene) -> Vec<TriggerInfo> {
        let from = scene.position().unwrap_or(scene.config().spawn);
        let active = scene.active_trigger();
        let mut out: Vec<TriggerInfo> = scene
            .triggers()
            .volumes()
            .iter()
            .map(|v| TriggerInfo {
                id: v.id.clone(),
                distance: from.distance(v.center),
                radius: v.radius,
                active: active == Some(&v.id),
            })
            .collect();
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        out
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    pub id: SceneId,
    pub name: String,
    pub tick: u64,
    pub ready: bool,
    pub captured: bool,
    /// `None` until a body is attached.
    pub position: Option<Vec3>,
    /// Speed along the ground plane; falling does not count.
    pub ground_speed: f32,
    pub camera: Vec3,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub active_trigger: Option<TriggerId>,
    pub trigger_count: usize,
    pub pending_events: usize,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scene {} '{}': tick={}", self.id, self.name, self.tick)?;
        match self.position {
            Some(p) => write!(f, " pos=({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)?,
            None => write!(f, " pos=none")?,
        }
        write!(
            f,
            " speed={:.2} yaw={:.1} pitch={:.1} active={} triggers={}",
            self.ground_speed,
            self.yaw_degrees,
            self.pitch_degrees,
            self.active_trigger.as_ref().map_or("none", |t| t.as_str()),
            self.trigger_count
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriggerInfo {
    pub id: TriggerId,
    pub distance: f32,
    pub radius: f32,
    pub active: bool,
}

impl std::fmt::Display for TriggerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:<16} d={:>7.2} r={:.2}", self.id.as_str(), self.distance, self.radius)?;
        if self.active {
            write!(f, " *")?;
        }
        Ok(())
    }
}
