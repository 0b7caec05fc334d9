//! The per-scene context object.
//!
//! Host callbacks only buffer into the scene ([`NavScene::handle_event`],
//! [`NavScene::confirm`], ...). All effects happen inside [`NavScene::tick`]
//! in a fixed order: queued commands, look, walk, physics step, camera
//! follow, triggers.

use glam::Vec3;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, info, trace, trace_span, warn};
use walkspace_common::{SceneId, TriggerId};
use walkspace_input::{
    Action, CaptureError, CaptureRequest, CaptureSignal, CaptureState, InputEvent, InputState,
    PointerCaptureController, PointerHost,
};
use walkspace_physics::{BodyHandle, PhysicsWorld};

use crate::config::{ConfigError, SceneConfig};
use crate::event::SceneEvent;
use crate::locomotion::LocomotionController;
use crate::orientation::{Orientation, OrientationIntegrator};
use crate::rig::{Camera, CameraRigSync};
use crate::teleport::TeleportService;
use crate::triggers::{
    ConfirmOutcome, ProximityTriggerSystem, TriggerAction, TriggerListener, TriggerTransition,
    TriggerVolume,
};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene has no physics body")]
    BodyMissing,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Prompt raised by the trigger the player stands in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompt {
    pub trigger: TriggerId,
    pub text: String,
    /// Declined; stays hidden until the player leaves and re-enters.
    pub dismissed: bool,
}

/// Overlay state the page draws. The core never draws it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Hud {
    pub help_visible: bool,
    pub prompt: Option<Prompt>,
    pub open_panel: Option<String>,
}

impl Hud {
    pub fn visible_prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref().filter(|p| !p.dismissed)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Hotkey(Action),
    Confirm(TriggerId),
    Decline,
    ClosePanel,
    UserExited,
}

/// Snapshot of one tick's outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Orientation,
    pub transition: TriggerTransition,
}

/// Routes trigger edges to the HUD, the event log and any page listeners.
struct Fanout<'a> {
    hud: &'a mut Hud,
    events: &'a mut Vec<SceneEvent>,
    listeners: &'a mut [Box<dyn TriggerListener>],
}

impl TriggerListener for Fanout<'_> {
    fn on_enter(&mut self, volume: &TriggerVolume) {
        self.hud.prompt = Some(Prompt {
            trigger: volume.id.clone(),
            text: volume.prompt.clone(),
            dismissed: false,
        });
        self.events.push(SceneEvent::TriggerEntered {
            id: volume.id.clone(),
            prompt: volume.prompt.clone(),
        });
        for l in self.listeners.iter_mut() {
            l.on_enter(volume);
        }
    }

    fn on_exit(&mut self, volume: &TriggerVolume) {
        if self.hud.prompt.as_ref().is_some_and(|p| p.trigger == volume.id) {
            self.hud.prompt = None;
        }
        self.events.push(SceneEvent::TriggerExited {
            id: volume.id.clone(),
        });
        for l in self.listeners.iter_mut() {
            l.on_exit(volume);
        }
    }
}

/// One walkable scene: input, capture, player body, camera and triggers.
pub struct NavScene {
    id: SceneId,
    config: SceneConfig,
    input: InputState,
    capture: PointerCaptureController,
    orientation: OrientationIntegrator,
    locomotion: LocomotionController,
    rig: CameraRigSync,
    triggers: ProximityTriggerSystem,
    camera: Camera,
    body: Option<BodyHandle>,
    hud: Hud,
    listeners: Vec<Box<dyn TriggerListener>>,
    commands: VecDeque<Command>,
    events: Vec<SceneEvent>,
    ready: bool,
    ticks: u64,
}

impl NavScene {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let id = SceneId::new();
        let look = Orientation::new(config.spawn_yaw, 0.0);
        let rig = CameraRigSync::new(config.eye_height, config.camera_smoothing);
        let mut camera = Camera::new(rig.target(config.spawn), config.fov_degrees);
        camera.orientation = look.rotation();
        info!(scene = %id, name = %config.name, triggers = config.triggers.len(), "scene created");

        Ok(Self {
            id,
            input: InputState::new(),
            capture: PointerCaptureController::new(),
            orientation: OrientationIntegrator::new(look),
            locomotion: LocomotionController::new(config.move_speed),
            rig,
            triggers: ProximityTriggerSystem::new(config.triggers.clone()),
            camera,
            body: None,
            hud: Hud::default(),
            listeners: Vec::new(),
            commands: VecDeque::new(),
            events: Vec::new(),
            ready: false,
            ticks: 0,
            config,
        })
    }

    /// Create the player body at the spawn point in `physics`.
    pub fn spawn_body(&mut self, physics: &mut dyn PhysicsWorld) -> BodyHandle {
        let handle = physics.create_body(self.config.body_desc());
        self.attach_body(handle.clone());
        handle
    }

    /// Use an existing body as the player.
    pub fn attach_body(&mut self, body: BodyHandle) {
        let position = body.borrow().position();
        self.rig.snap(&mut self.camera, position);
        self.body = Some(body);
    }

    /// Stop driving the player body. Ticks fail until one is attached again.
    pub fn detach_body(&mut self) -> Option<BodyHandle> {
        self.body.take()
    }

    /// Page-side trigger callbacks, called after the HUD has been updated.
    pub fn add_listener(&mut self, listener: Box<dyn TriggerListener>) {
        self.listeners.push(listener);
    }

    /// Buffer one host input event.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::Key { code, down: true } => {
                let fresh = self.input.press(&code, &self.config.bindings);
                if !fresh {
                    return;
                }
                if let Some(action) = self.config.bindings.hotkey(&code) {
                    trace!(%code, ?action, "hotkey queued");
                    self.commands.push_back(Command::Hotkey(action.clone()));
                }
            }
            InputEvent::Key { code, down: false } => {
                self.input.release(&code, &self.config.bindings);
            }
            InputEvent::Mouse { dx, dy } => {
                if self.capture.is_captured() {
                    self.input.accumulate_look(dx, dy);
                }
            }
            InputEvent::CaptureChange { is_captured } => {
                if let Some(CaptureSignal::UserExited) = self.capture.on_capture_changed(is_captured) {
                    self.commands.push_back(Command::UserExited);
                }
            }
            InputEvent::FocusLost => {
                debug!(scene = %self.id, "focus lost, clearing held keys");
                self.input.clear_keys();
            }
        }
    }

    /// Ask the host for pointer capture. Call from a click handler.
    pub fn request_capture(
        &mut self,
        host: Option<&mut dyn PointerHost>,
    ) -> Result<CaptureRequest, CaptureError> {
        self.capture.request_capture(host)
    }

    /// Queue an action as if its hotkey had been pressed (HUD buttons).
    pub fn queue_action(&mut self, action: Action) {
        self.commands.push_back(Command::Hotkey(action));
    }

    /// The UI accepted the prompt of `id`.
    pub fn confirm(&mut self, id: impl Into<TriggerId>) {
        self.commands.push_back(Command::Confirm(id.into()));
    }

    /// The UI declined the current prompt.
    pub fn decline(&mut self) {
        self.commands.push_back(Command::Decline);
    }

    pub fn close_panel(&mut self) {
        self.commands.push_back(Command::ClosePanel);
    }

    /// Loading finished. Shows the controls help and starts reporting user
    /// exits; before this, losing capture is not a reason to leave.
    pub fn mark_ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        self.set_help(true);
        info!(scene = %self.id, "scene ready");
    }

    /// Move the player now, outside the tick.
    pub fn teleport(&mut self, target: Vec3) -> Result<Vec3, SceneError> {
        let body = self.body.as_ref().ok_or(SceneError::BodyMissing)?;
        let from = TeleportService::teleport(&mut *body.borrow_mut(), &mut self.camera, &self.rig, target);
        self.events.push(SceneEvent::Teleported { from, to: target });
        Ok(from)
    }

    /// Advance one frame.
    pub fn tick(
        &mut self,
        dt: f32,
        physics: &mut dyn PhysicsWorld,
        host: &mut dyn PointerHost,
    ) -> Result<TickReport, SceneError> {
        let _span = trace_span!("scene_tick", scene = %self.id, tick = self.ticks).entered();
        let body = self.body.clone().ok_or(SceneError::BodyMissing)?;

        self.run_commands(host)?;

        let (dx, dy) = self.input.take_look_delta();
        let orientation = self.orientation.integrate(dx, dy, self.config.look_sensitivity);

        self.locomotion.apply(&self.input, orientation.yaw, &mut *body.borrow_mut());

        physics.step(dt);

        let (position, velocity) = {
            let b = body.borrow();
            (b.position(), b.velocity())
        };
        self.rig.sync(&mut self.camera, position, &orientation);

        let mut fanout = Fanout {
            hud: &mut self.hud,
            events: &mut self.events,
            listeners: &mut self.listeners,
        };
        let transition = self.triggers.update(position, &mut fanout);

        let report = TickReport {
            tick: self.ticks,
            position,
            velocity,
            orientation,
            transition,
        };
        self.ticks += 1;
        trace!(?position, ?velocity, yaw = orientation.yaw, pitch = orientation.pitch, "tick");
        Ok(report)
    }

    /// Give the pointer back and drop the body. The scene stays usable but
    /// inert until a body is attached again.
    pub fn shutdown(&mut self, host: &mut dyn PointerHost) {
        self.capture.release(host);
        let had_body = self.detach_body().is_some();
        self.input.clear_keys();
        self.triggers.clear_active();
        info!(scene = %self.id, had_body, "scene shut down");
    }

    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[SceneEvent] {
        &self.events
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation.orientation()
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    pub fn is_captured(&self) -> bool {
        self.capture.is_captured()
    }

    pub fn triggers(&self) -> &ProximityTriggerSystem {
        &self.triggers
    }

    pub fn active_trigger(&self) -> Option<&TriggerId> {
        self.triggers.active()
    }

    pub fn body(&self) -> Option<&BodyHandle> {
        self.body.as_ref()
    }

    /// Fresh read from the body.
    pub fn position(&self) -> Option<Vec3> {
        self.body.as_ref().map(|b| b.borrow().position())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn run_commands(&mut self, host: &mut dyn PointerHost) -> Result<(), SceneError> {
        while let Some(cmd) = self.commands.pop_front() {
            match cmd {
                Command::Hotkey(action) => self.run_action(action, host)?,
                Command::Confirm(id) => self.confirm_trigger(id, host)?,
                Command::Decline => self.decline_prompt(),
                Command::ClosePanel => {
                    if let Some(panel) = self.hud.open_panel.take() {
                        self.events.push(SceneEvent::PanelClosed { panel });
                    }
                }
                Command::UserExited => {
                    if self.ready {
                        info!(scene = %self.id, "user left pointer capture");
                        self.events.push(SceneEvent::UserExited);
                    } else {
                        debug!(scene = %self.id, "capture lost while loading, not leaving");
                    }
                }
            }
        }
        Ok(())
    }

    fn run_action(&mut self, action: Action, host: &mut dyn PointerHost) -> Result<(), SceneError> {
        match action {
            Action::ShowHelp => self.set_help(true),
            Action::HideHelp => self.set_help(false),
            Action::Navigate { route } => self.navigate(route, host),
            Action::Teleport { target } => {
                self.teleport(target)?;
            }
            Action::Respawn => {
                self.teleport(self.config.spawn)?;
                self.orientation
                    .reset(Orientation::new(self.config.spawn_yaw, 0.0));
            }
            Action::Confirm => match self.triggers.active().cloned() {
                Some(id) if self.hud.visible_prompt().is_none() => {
                    self.events.push(SceneEvent::ConfirmIgnored {
                        id: Some(id),
                        reason: "prompt dismissed".into(),
                    });
                }
                Some(id) => self.confirm_trigger(id, host)?,
                None => {
                    self.events.push(SceneEvent::ConfirmIgnored {
                        id: None,
                        reason: "no active trigger".into(),
                    });
                }
            },
            Action::Decline => self.decline_prompt(),
            Action::Noop => {}
        }
        Ok(())
    }

    fn confirm_trigger(&mut self, id: TriggerId, host: &mut dyn PointerHost) -> Result<(), SceneError> {
        let action = match self.triggers.confirm_action(&id) {
            ConfirmOutcome::Invoke(action) => action,
            ConfirmOutcome::NotOffered => {
                self.events.push(SceneEvent::ConfirmIgnored {
                    id: Some(id),
                    reason: "not the active trigger".into(),
                });
                return Ok(());
            }
            ConfirmOutcome::Unbound => {
                self.events.push(SceneEvent::ConfirmIgnored {
                    id: Some(id),
                    reason: "no action registered".into(),
                });
                return Ok(());
            }
        };

        info!(scene = %self.id, trigger = %id, ?action, "trigger confirmed");
        if let Some(p) = self.hud.prompt.as_mut() {
            p.dismissed = true;
        }
        self.events.push(SceneEvent::ActionConfirmed {
            id,
            action: action.clone(),
        });
        match action {
            TriggerAction::Teleport { target } => {
                self.teleport(target)?;
            }
            TriggerAction::Navigate { route } => self.navigate(route, host),
            TriggerAction::OpenPanel { panel } => {
                // Panels need a free cursor.
                self.capture.release(host);
                self.hud.open_panel = Some(panel.clone());
                self.events.push(SceneEvent::PanelOpened { panel });
            }
        }
        Ok(())
    }

    fn decline_prompt(&mut self) {
        match self.hud.prompt.as_mut() {
            Some(p) if !p.dismissed => {
                p.dismissed = true;
                debug!(trigger = %p.trigger, "prompt declined");
                self.events.push(SceneEvent::PromptDeclined {
                    id: p.trigger.clone(),
                });
            }
            _ => warn!(scene = %self.id, "decline with no prompt showing"),
        }
    }

    fn navigate(&mut self, route: String, host: &mut dyn PointerHost) {
        self.capture.release(host);
        info!(scene = %self.id, %route, "navigation requested");
        self.events.push(SceneEvent::NavigationRequested { route });
    }

    fn set_help(&mut self, visible: bool) {
        if self.hud.help_visible == visible {
            return;
        }
        self.hud.help_visible = visible;
        self.events.push(SceneEvent::HelpToggled { visible });
    }
}

impl Drop for NavScene {
    fn drop(&mut self) {
        info!(scene = %self.id, ticks = self.ticks, "scene torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::f32::consts::FRAC_PI_2;
    use std::rc::Rc;
    use walkspace_input::HeadlessHost;
    use walkspace_physics::SimplePhysics;

    const DT: f32 = 1.0 / 60.0;
    const EPS: f32 = 1e-4;

    struct Rig {
        scene: NavScene,
        physics: SimplePhysics,
        host: HeadlessHost,
    }

    impl Rig {
        fn new(config: SceneConfig) -> Self {
            let mut physics = SimplePhysics::new();
            let mut scene = NavScene::new(config).unwrap();
            scene.spawn_body(&mut physics);
            Self {
                scene,
                physics,
                host: HeadlessHost::new(),
            }
        }

        fn tick(&mut self) -> TickReport {
            self.scene.tick(DT, &mut self.physics, &mut self.host).unwrap()
        }

        fn deliver(&mut self) {
            for n in self.host.take_notifications() {
                self.scene
                    .handle_event(InputEvent::CaptureChange { is_captured: n });
            }
        }

        fn capture(&mut self) {
            self.scene.request_capture(Some(&mut self.host)).unwrap();
            self.deliver();
            assert_eq!(self.scene.capture_state(), CaptureState::Captured);
        }

        fn key(&mut self, code: &str) {
            self.scene.handle_event(InputEvent::key_down(code));
        }
    }

    fn empty_room() -> SceneConfig {
        SceneConfig {
            spawn: Vec3::new(0.0, 0.5, 0.0),
            triggers: vec![],
            ..SceneConfig::default()
        }
    }

    fn room_with(triggers: Vec<TriggerVolume>) -> SceneConfig {
        SceneConfig {
            triggers,
            ..empty_room()
        }
    }

    #[test]
    fn tick_without_body_is_an_error() {
        let mut scene = NavScene::new(empty_room()).unwrap();
        let mut physics = SimplePhysics::new();
        let mut host = HeadlessHost::new();
        let err = scene.tick(DT, &mut physics, &mut host).unwrap_err();
        assert!(matches!(err, SceneError::BodyMissing));
        assert!(matches!(scene.teleport(Vec3::ZERO), Err(SceneError::BodyMissing)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SceneConfig {
            move_speed: 0.0,
            ..SceneConfig::default()
        };
        assert!(matches!(NavScene::new(config), Err(SceneError::Config(_))));
    }

    #[test]
    fn camera_starts_at_eye_height_above_spawn() {
        let scene = NavScene::new(SceneConfig::default()).unwrap();
        assert_eq!(scene.camera().position, Vec3::new(-3.0, 1.5, 3.0));
        assert_eq!(scene.camera().fov_degrees, 45.0);
    }

    #[test]
    fn forward_walks_along_plus_z_at_spawn_yaw() {
        let mut rig = Rig::new(empty_room());
        rig.key("KeyW");
        let report = rig.tick();
        assert!((report.velocity.z - 6.0).abs() < EPS);
        assert!(report.velocity.x.abs() < EPS);
        assert!((report.position.z - 6.0 * DT).abs() < EPS);
        assert_eq!(report.position.y, 0.5);
        assert_eq!(rig.scene.camera().position, report.position + Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn releasing_keys_stops_horizontal_motion() {
        let mut rig = Rig::new(empty_room());
        rig.key("KeyW");
        rig.tick();
        rig.scene.handle_event(InputEvent::key_up("KeyW"));
        let report = rig.tick();
        assert_eq!(report.velocity.x, 0.0);
        assert_eq!(report.velocity.z, 0.0);
    }

    #[test]
    fn turn_and_walk_in_one_tick_use_the_new_facing() {
        let mut rig = Rig::new(empty_room());
        rig.capture();
        let s = rig.scene.config().look_sensitivity;
        // dx < 0 turns left, toward +X.
        rig.scene.handle_event(InputEvent::Mouse {
            dx: -FRAC_PI_2 / s,
            dy: 0.0,
        });
        rig.key("KeyW");
        let report = rig.tick();
        assert!((report.orientation.yaw - FRAC_PI_2).abs() < 1e-3);
        assert!((report.velocity.x - 6.0).abs() < 1e-2);
        assert!(report.velocity.z.abs() < 1e-2);
    }

    #[test]
    fn mouse_is_ignored_without_capture() {
        let mut rig = Rig::new(empty_room());
        rig.scene.handle_event(InputEvent::Mouse { dx: 500.0, dy: 500.0 });
        let report = rig.tick();
        assert_eq!(report.orientation, Orientation::default());
    }

    #[test]
    fn pitch_stays_clamped_through_the_scene() {
        let mut rig = Rig::new(empty_room());
        rig.capture();
        for _ in 0..10 {
            rig.scene.handle_event(InputEvent::Mouse { dx: 0.0, dy: -5000.0 });
            let r = rig.tick();
            assert!(r.orientation.pitch <= FRAC_PI_2);
        }
        assert_eq!(rig.scene.orientation().pitch, FRAC_PI_2);
    }

    #[test]
    fn focus_loss_stops_walking() {
        let mut rig = Rig::new(empty_room());
        rig.key("KeyD");
        rig.tick();
        rig.scene.handle_event(InputEvent::FocusLost);
        let report = rig.tick();
        assert_eq!(report.velocity.x, 0.0);
        assert!(!rig.scene.input().any_movement());
    }

    #[test]
    fn entering_a_trigger_raises_its_prompt_once() {
        let mut rig = Rig::new(room_with(vec![
            TriggerVolume::new("sign", Vec3::new(0.0, 0.5, 1.0), 0.5).with_prompt("Read the sign?"),
        ]));
        rig.key("KeyW");
        let mut entered = 0;
        for _ in 0..120 {
            rig.tick();
            for e in rig.scene.drain_events() {
                if matches!(e, SceneEvent::TriggerEntered { .. }) {
                    entered += 1;
                }
            }
            if rig.scene.active_trigger().is_some() {
                let p = rig.scene.hud().visible_prompt().unwrap();
                assert_eq!(p.text, "Read the sign?");
            }
        }
        assert_eq!(entered, 1);
        // Walked through and out the other side.
        assert!(rig.scene.active_trigger().is_none());
        assert!(rig.scene.hud().prompt.is_none());
    }

    #[test]
    fn decline_hides_prompt_until_reentry() {
        let mut rig = Rig::new(room_with(vec![TriggerVolume::new("sign", Vec3::ZERO, 2.0)
            .with_prompt("?")
            .with_action(TriggerAction::OpenPanel {
                panel: "sign".into(),
            })]));
        rig.tick();
        assert!(rig.scene.hud().visible_prompt().is_some());

        rig.key("KeyN");
        rig.tick();
        assert!(rig.scene.hud().visible_prompt().is_none());

        // Confirm hotkey does nothing while the prompt is dismissed.
        rig.key("KeyY");
        rig.tick();
        assert!(rig.scene.hud().open_panel.is_none());
        assert!(rig.scene.events().iter().any(|e| matches!(
            e,
            SceneEvent::ConfirmIgnored { reason, .. } if reason == "prompt dismissed"
        )));

        rig.scene.teleport(Vec3::new(10.0, 0.5, 0.0)).unwrap();
        rig.tick();
        rig.scene.teleport(Vec3::new(0.0, 0.5, 0.0)).unwrap();
        rig.tick();
        assert!(rig.scene.hud().visible_prompt().is_some());
    }

    #[test]
    fn confirming_a_portal_teleports_at_rest() {
        let target = Vec3::new(0.0, 0.5, 200.0);
        let mut rig = Rig::new(room_with(vec![
            TriggerVolume::new("portal", Vec3::ZERO, 2.0).with_action(TriggerAction::Teleport { target }),
            TriggerVolume::new("arrival", target, 1.0),
        ]));
        rig.tick();
        assert_eq!(rig.scene.active_trigger(), Some(&TriggerId::new("portal")));
        rig.scene.drain_events();

        rig.scene.confirm("portal");
        let report = rig.tick();
        assert_eq!(report.position, target);
        assert_eq!(report.velocity, Vec3::ZERO);
        assert_eq!(rig.scene.camera().position, target + Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(
            report.transition,
            TriggerTransition {
                exited: Some("portal".into()),
                entered: Some("arrival".into()),
            }
        );
        let events = rig.scene.drain_events();
        assert!(matches!(events[0], SceneEvent::ActionConfirmed { .. }));
        assert!(matches!(events[1], SceneEvent::Teleported { .. }));
    }

    #[test]
    fn confirming_an_inactive_trigger_is_ignored() {
        let mut rig = Rig::new(room_with(vec![TriggerVolume::new(
            "far",
            Vec3::new(50.0, 0.5, 0.0),
            1.0,
        )
        .with_action(TriggerAction::Navigate { route: "/".into() })]));
        rig.scene.confirm("far");
        rig.tick();
        let events = rig.scene.drain_events();
        assert_eq!(
            events,
            vec![SceneEvent::ConfirmIgnored {
                id: Some("far".into()),
                reason: "not the active trigger".into(),
            }]
        );
    }

    #[test]
    fn open_panel_frees_the_cursor_without_user_exit() {
        let mut rig = Rig::new(room_with(vec![TriggerVolume::new("desk", Vec3::ZERO, 2.0)
            .with_action(TriggerAction::OpenPanel {
                panel: "upload".into(),
            })]));
        rig.scene.mark_ready();
        rig.capture();
        rig.tick();
        rig.scene.confirm("desk");
        rig.tick();
        assert_eq!(rig.scene.hud().open_panel.as_deref(), Some("upload"));
        rig.deliver();
        rig.tick();
        assert_eq!(rig.scene.capture_state(), CaptureState::Free);
        assert!(!rig.scene.events().contains(&SceneEvent::UserExited));

        rig.scene.close_panel();
        rig.tick();
        assert!(rig.scene.hud().open_panel.is_none());
    }

    #[test]
    fn hotkey_navigation_releases_capture_quietly() {
        let mut rig = Rig::new(empty_room());
        rig.scene.mark_ready();
        rig.capture();
        rig.key("Digit2");
        rig.tick();
        assert_eq!(rig.host.exits, 1);
        rig.deliver();
        rig.tick();

        let events = rig.scene.drain_events();
        assert!(events.contains(&SceneEvent::NavigationRequested {
            route: "/audio-recorder".into()
        }));
        assert!(!events.contains(&SceneEvent::UserExited));
    }

    #[test]
    fn hotkey_navigation_before_grant_is_not_a_user_exit() {
        let mut rig = Rig::new(empty_room());
        rig.scene.mark_ready();
        rig.scene.request_capture(Some(&mut rig.host)).unwrap();
        assert_eq!(rig.scene.capture_state(), CaptureState::Requested);
        rig.key("Digit1");
        rig.tick();
        assert_eq!(rig.host.exits, 1);
        rig.deliver();
        rig.tick();

        let events = rig.scene.drain_events();
        assert!(events.contains(&SceneEvent::NavigationRequested { route: "/".into() }));
        assert!(!events.contains(&SceneEvent::UserExited));
        assert_eq!(rig.scene.capture_state(), CaptureState::Free);
    }

    #[test]
    fn escape_reports_user_exit_only_when_ready() {
        let mut rig = Rig::new(empty_room());
        rig.capture();
        rig.host.user_escape();
        rig.deliver();
        rig.tick();
        assert!(!rig.scene.events().contains(&SceneEvent::UserExited));

        rig.scene.mark_ready();
        rig.capture();
        rig.host.user_escape();
        rig.deliver();
        rig.tick();
        assert!(rig.scene.events().contains(&SceneEvent::UserExited));
    }

    #[test]
    fn help_popup_follows_ready_and_hotkeys() {
        let mut rig = Rig::new(empty_room());
        assert!(!rig.scene.hud().help_visible);
        rig.scene.mark_ready();
        assert!(rig.scene.hud().help_visible);

        rig.key("KeyX");
        rig.tick();
        assert!(!rig.scene.hud().help_visible);

        rig.key("KeyH");
        rig.key("KeyH"); // OS key repeat
        rig.tick();
        assert!(rig.scene.hud().help_visible);
        let toggles = rig
            .scene
            .events()
            .iter()
            .filter(|e| matches!(e, SceneEvent::HelpToggled { .. }))
            .count();
        assert_eq!(toggles, 3);
    }

    #[test]
    fn respawn_restores_spawn_pose() {
        let mut rig = Rig::new(empty_room());
        rig.capture();
        rig.scene.handle_event(InputEvent::Mouse { dx: 300.0, dy: 100.0 });
        rig.key("KeyW");
        for _ in 0..30 {
            rig.tick();
        }
        rig.scene.handle_event(InputEvent::key_up("KeyW"));
        rig.key("KeyR");
        let report = rig.tick();
        assert_eq!(report.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(report.orientation, Orientation::default());
    }

    #[test]
    fn capture_without_host_surface_fails() {
        let mut scene = NavScene::new(empty_room()).unwrap();
        assert_eq!(scene.request_capture(None), Err(CaptureError::NoHostSurface));
        assert_eq!(scene.capture_state(), CaptureState::Free);
    }

    #[test]
    fn refused_capture_stays_free() {
        let mut rig = Rig::new(empty_room());
        rig.host.refuse = true;
        let r = rig.scene.request_capture(Some(&mut rig.host)).unwrap();
        assert_eq!(r, CaptureRequest::NotGranted);
        assert_eq!(rig.scene.capture_state(), CaptureState::Free);
    }

    #[test]
    fn page_listeners_see_edges_in_order() {
        struct Log(Rc<RefCell<Vec<String>>>);
        impl TriggerListener for Log {
            fn on_enter(&mut self, v: &TriggerVolume) {
                self.0.borrow_mut().push(format!("enter {}", v.id));
            }
            fn on_exit(&mut self, v: &TriggerVolume) {
                self.0.borrow_mut().push(format!("exit {}", v.id));
            }
        }

        let log = Rc::new(RefCell::new(Vec::new()));
        let mut rig = Rig::new(room_with(vec![
            TriggerVolume::new("a", Vec3::ZERO, 1.0),
            TriggerVolume::new("b", Vec3::new(10.0, 0.5, 0.0), 1.0),
        ]));
        rig.scene.add_listener(Box::new(Log(log.clone())));
        rig.tick();
        rig.scene.teleport(Vec3::new(10.0, 0.5, 0.0)).unwrap();
        rig.tick();
        assert_eq!(*log.borrow(), vec!["enter a", "exit a", "enter b"]);
    }

    #[test]
    fn shutdown_frees_pointer_and_body() {
        let mut rig = Rig::new(empty_room());
        rig.scene.mark_ready();
        rig.capture();
        rig.key("KeyW");
        rig.tick();

        rig.scene.shutdown(&mut rig.host);
        assert_eq!(rig.host.exits, 1);
        assert!(rig.scene.body().is_none());
        assert!(rig.scene.position().is_none());
        assert!(!rig.scene.input().any_movement());
        rig.deliver();
        assert!(!rig.scene.is_captured());
        assert!(matches!(
            rig.scene.tick(DT, &mut rig.physics, &mut rig.host),
            Err(SceneError::BodyMissing)
        ));
        assert!(!rig.scene.events().contains(&SceneEvent::UserExited));

        rig.physics.step(DT);
        assert_eq!(rig.physics.body_count(), 0);
    }

    #[test]
    fn dropped_scene_leaves_the_physics_world() {
        let mut physics = SimplePhysics::new();
        {
            let mut scene = NavScene::new(empty_room()).unwrap();
            scene.spawn_body(&mut physics);
            assert_eq!(physics.body_count(), 1);
        }
        physics.step(DT);
        assert_eq!(physics.body_count(), 0);
    }
}
