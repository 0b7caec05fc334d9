use glam::{Mat4, Quat, Vec3};
use std::fmt::Write;
use walkspace_kernel::{Camera, NavScene};

/// Camera pose as handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCamera {
    pub position: Vec3,
    pub orientation: Quat,
    pub fov_degrees: f32,
}

impl From<&Camera> for RenderCamera {
    fn from(camera: &Camera) -> Self {
        Self {
            position: camera.position,
            orientation: camera.orientation,
            fov_degrees: camera.fov_degrees,
        }
    }
}

impl RenderCamera {
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }

    /// Right-handed view matrix looking along [`Self::forward`].
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, 0.1, 1000.0)
    }
}

/// Per-frame view of a scene.
#[derive(Debug, Clone)]
pub struct RenderView {
    pub camera: RenderCamera,
    pub help_visible: bool,
    pub prompt: Option<String>,
    pub open_panel: Option<String>,
}

impl RenderView {
    pub fn from_scene(scene: &NavScene) -> Self {
        let hud = scene.hud();
        Self {
            camera: RenderCamera::from(scene.camera()),
            help_visible: hud.help_visible,
            prompt: hud.visible_prompt().map(|p| p.text.clone()),
            open_panel: hud.open_panel.clone(),
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &NavScene, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of a frame, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &NavScene, view: &RenderView) -> String {
        let mut out = String::new();
        let cam = &view.camera;
        let fwd = cam.forward();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "=== Scene {} '{}' (tick={}) ===", scene.id(), scene.config().name, scene.ticks());
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) forward=({:.2}, {:.2}, {:.2}) fov={:.0}",
            cam.position.x, cam.position.y, cam.position.z, fwd.x, fwd.y, fwd.z, cam.fov_degrees
        );
        let _ = writeln!(out, "Capture: {:?}", scene.capture_state());
        match scene.active_trigger() {
            Some(id) => {
                let _ = writeln!(out, "Active trigger: {id}");
            }
            None => out.push_str("Active trigger: none\n"),
        }
        if let Some(prompt) = &view.prompt {
            let _ = writeln!(out, "Prompt: {prompt} [Y/N]");
        }
        if let Some(panel) = &view.open_panel {
            let _ = writeln!(out, "Panel: {panel}");
        }
        if view.help_visible {
            out.push_str("Help: WASD/arrows move, mouse looks, H/X help, 1-3 leave, R respawn\n");
        }
        tracing::trace!(tick = scene.ticks(), bytes = out.len(), "debug frame rendered");
        out
    }
}
