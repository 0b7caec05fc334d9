//! Scripted input timelines for headless simulation.
//!
//! ```yaml
//! dt: 0.016667
//! ticks: 240
//! capture: true
//! ready: true
//! steps:
//!   - { at: 0, input: key_down, code: KeyW }
//!   - { at: 30, input: mouse, dx: -120.0, dy: 0.0 }
//!   - { at: 90, input: confirm, trigger: recognizer }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use walkspace_common::TriggerId;
use walkspace_input::{HeadlessHost, InputEvent};
use walkspace_kernel::{NavScene, SceneEvent, TickReport};
use walkspace_physics::SimplePhysics;

fn default_dt() -> f32 {
    1.0 / 60.0
}

fn default_ticks() -> u64 {
    120
}

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Grab the pointer before the first tick, as a click would.
    #[serde(default)]
    pub capture: bool,
    /// Mark the scene loaded before the first tick.
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// Tick index the input is delivered before.
    pub at: u64,
    #[serde(flatten)]
    pub input: ScriptInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum ScriptInput {
    KeyDown { code: String },
    KeyUp { code: String },
    Mouse { dx: f32, dy: f32 },
    Click,
    Escape,
    FocusLost,
    Confirm { trigger: TriggerId },
    Decline,
    ClosePanel,
}

impl Default for Script {
    /// Walk forward from spawn for two seconds.
    fn default() -> Self {
        Self {
            dt: default_dt(),
            ticks: default_ticks(),
            capture: true,
            ready: true,
            steps: vec![Step {
                at: 0,
                input: ScriptInput::KeyDown { code: "KeyW".into() },
            }],
        }
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing script {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut script: Script = serde_yaml::from_str(yaml)?;
        anyhow::ensure!(script.dt > 0.0, "dt must be greater than zero");
        script.steps.sort_by_key(|s| s.at);
        Ok(script)
    }
}

/// Everything a run produced, in tick order.
#[derive(Debug, Default, serde::Serialize)]
pub struct RunLog {
    pub reports: Vec<TickReport>,
    pub events: Vec<(u64, SceneEvent)>,
}

/// Drive `scene` through `script` with a headless host.
pub fn run(scene: &mut NavScene, physics: &mut SimplePhysics, script: &Script) -> Result<RunLog> {
    let mut host = HeadlessHost::new();
    let mut log = RunLog::default();

    if script.ready {
        scene.mark_ready();
    }
    if script.capture {
        scene.request_capture(Some(&mut host))?;
        deliver(scene, &mut host);
    }

    let mut steps = script.steps.iter().peekable();
    for tick in 0..script.ticks {
        while let Some(step) = steps.next_if(|s| s.at <= tick) {
            apply(scene, &mut host, &step.input)?;
        }
        let report = scene.tick(script.dt, physics, &mut host)?;
        deliver(scene, &mut host);
        log.events
            .extend(scene.drain_events().into_iter().map(|e| (tick, e)));
        log.reports.push(report);
    }
    Ok(log)
}

fn apply(scene: &mut NavScene, host: &mut HeadlessHost, input: &ScriptInput) -> Result<()> {
    match input {
        ScriptInput::KeyDown { code } => scene.handle_event(InputEvent::key_down(code.clone())),
        ScriptInput::KeyUp { code } => scene.handle_event(InputEvent::key_up(code.clone())),
        ScriptInput::Mouse { dx, dy } => scene.handle_event(InputEvent::Mouse { dx: *dx, dy: *dy }),
        ScriptInput::Click => {
            scene.request_capture(Some(&mut *host))?;
            deliver(scene, host);
        }
        ScriptInput::Escape => {
            host.user_escape();
            deliver(scene, host);
        }
        ScriptInput::FocusLost => scene.handle_event(InputEvent::FocusLost),
        ScriptInput::Confirm { trigger } => scene.confirm(trigger.clone()),
        ScriptInput::Decline => scene.decline(),
        ScriptInput::ClosePanel => scene.close_panel(),
    }
    Ok(())
}

fn deliver(scene: &mut NavScene, host: &mut HeadlessHost) {
    for is_captured in host.take_notifications() {
        scene.handle_event(InputEvent::CaptureChange { is_captured });
    }
}
