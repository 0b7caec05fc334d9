mod host;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use host::DesktopHost;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use walkspace_input::{Action, InputEvent, PointerHost};
use walkspace_kernel::{NavScene, SceneConfig, SceneEvent};
use walkspace_physics::SimplePhysics;
use walkspace_render::RenderView;
use walkspace_tools::SceneInspector;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "walkspace-desktop", about = "Walk a walkspace scene in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene YAML; the built-in home scene when omitted
    #[arg(long)]
    scene: Option<PathBuf>,
}

const TICK_RATE: f64 = 1.0 / 60.0;
const EVENT_HISTORY: usize = 8;

/// Scene, physics and the page-side state around them.
struct AppState {
    scene: NavScene,
    physics: SimplePhysics,
    host: DesktopHost,
    /// Route the scene asked to leave for. There are no other pages here,
    /// so the HUD shows it and offers to come back.
    left_for: Option<String>,
    recent: VecDeque<String>,
    last_frame: Instant,
    tick_accumulator: f64,
}

impl AppState {
    fn new(config: SceneConfig) -> Result<Self> {
        let mut physics = SimplePhysics::new();
        let mut scene = NavScene::new(config)?;
        scene.spawn_body(&mut physics);
        Ok(Self {
            scene,
            physics,
            host: DesktopHost::new(),
            left_for: None,
            recent: VecDeque::new(),
            last_frame: Instant::now(),
            tick_accumulator: 0.0,
        })
    }

    fn deliver_capture_changes(&mut self) {
        for is_captured in self.host.take_notifications() {
            self.scene
                .handle_event(InputEvent::CaptureChange { is_captured });
        }
    }

    fn click(&mut self) {
        if self.left_for.is_some() || self.scene.hud().open_panel.is_some() {
            return;
        }
        let host: Option<&mut dyn PointerHost> = if self.host.has_surface() {
            Some(&mut self.host)
        } else {
            None
        };
        match self.scene.request_capture(host) {
            Ok(outcome) => tracing::debug!(?outcome, "capture requested"),
            Err(e) => tracing::warn!("capture request failed: {e}"),
        }
        self.deliver_capture_changes();
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        // Escape belongs to the window system while grabbed, like a browser.
        if key == KeyCode::Escape {
            if pressed {
                self.host.lost_by_user();
                self.deliver_capture_changes();
            }
            return;
        }
        let code = format!("{key:?}");
        self.scene.handle_event(InputEvent::Key {
            code,
            down: pressed,
        });
    }

    fn update(&mut self, dt: f32) {
        self.tick_accumulator += dt as f64;
        while self.tick_accumulator >= TICK_RATE {
            self.tick_accumulator -= TICK_RATE;
            if let Err(e) = self
                .scene
                .tick(TICK_RATE as f32, &mut self.physics, &mut self.host)
            {
                tracing::error!("scene tick failed: {e}");
                break;
            }
            self.deliver_capture_changes();
        }

        for event in self.scene.drain_events() {
            match &event {
                SceneEvent::NavigationRequested { route } => {
                    tracing::info!(%route, "leaving scene");
                    self.left_for = Some(route.clone());
                }
                SceneEvent::UserExited => {
                    tracing::info!("pointer released by user, returning home");
                    self.left_for = Some("/".to_string());
                }
                _ => {}
            }
            if self.recent.len() == EVENT_HISTORY {
                self.recent.pop_front();
            }
            self.recent.push_back(format!("{event:?}"));
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        let summary = SceneInspector::summary(&self.scene);
        let view = RenderView::from_scene(&self.scene);

        egui::Window::new("Scene")
            .anchor(egui::Align2::LEFT_TOP, [8.0, 8.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("{} ({})", summary.name, summary.id));
                if let Some(p) = summary.position {
                    ui.label(format!("Position: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z));
                }
                ui.label(format!(
                    "Yaw {:.0}  Pitch {:.0}",
                    summary.yaw_degrees, summary.pitch_degrees
                ));
                ui.label(format!("Capture: {:?}", self.scene.capture_state()));
                ui.label(format!(
                    "Trigger: {}",
                    summary.active_trigger.as_ref().map_or("none", |t| t.as_str())
                ));
                if !summary.captured {
                    ui.small("Click to look around");
                }
                ui.separator();
                for line in &self.recent {
                    ui.small(line);
                }
            });

        if let Some(prompt) = self.scene.hud().visible_prompt().cloned() {
            egui::Window::new("prompt")
                .title_bar(false)
                .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -40.0])
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&prompt.text);
                    ui.horizontal(|ui| {
                        if ui.button("Yes (Y)").clicked() {
                            self.scene.confirm(prompt.trigger.clone());
                        }
                        if ui.button("No (N)").clicked() {
                            self.scene.decline();
                        }
                    });
                });
        }

        if view.help_visible {
            egui::Window::new("Controls")
                .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Click: capture the mouse");
                    ui.label("WASD / arrows: walk");
                    ui.label("Mouse: look");
                    ui.label("Y / N: answer a prompt");
                    ui.label("R: back to spawn");
                    ui.label("1 / 2 / 3: home, recorder, about");
                    ui.label("Esc: release the mouse");
                    if ui.button("Hide (X)").clicked() {
                        self.scene.queue_action(Action::HideHelp);
                    }
                });
        }

        if let Some(panel) = view.open_panel.as_deref() {
            egui::Window::new(panel_title(panel))
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(panel_body(panel));
                    if ui.button("Close").clicked() {
                        self.scene.close_panel();
                    }
                });
        }

        if let Some(route) = self.left_for.clone() {
            egui::Window::new("Navigation")
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(format!("The scene asked to open {route}"));
                    if ui.button("Back to the scene").clicked() {
                        self.left_for = None;
                    }
                });
        }
    }
}

fn panel_title(panel: &str) -> &str {
    match panel {
        "upload" => "Image recognition",
        "about" => "About",
        "credits" => "Credits",
        other => other,
    }
}

fn panel_body(panel: &str) -> &'static str {
    match panel {
        "upload" => "Drop an image here to have it recognized.",
        "about" => "A first-person walk through a small portfolio space.",
        "credits" => "Built with winit, wgpu and egui.",
        _ => "",
    }
}

/// Everything that exists only once a window does.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Walkspace")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("walkspace_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        // High up in the info area the sky darkens.
        let sky = match self.state.scene.position() {
            Some(p) if p.z > 100.0 => wgpu::Color {
                r: 0.05,
                g: 0.07,
                b: 0.15,
                a: 1.0,
            },
            _ => wgpu::Color {
                r: 0.45,
                g: 0.62,
                b: 0.85,
                a: 1.0,
            },
        };
        {
            let _clear = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(sky),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
        }
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.host.attach(gpu.window.clone());
                self.gpu = Some(gpu);
                self.state.scene.mark_ready();
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.scene.shutdown(&mut self.state.host);
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.scene.handle_event(InputEvent::FocusLost);
                self.state.host.lost_by_user();
                self.state.deliver_capture_changes();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                self.state.click();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.scene.handle_event(InputEvent::Mouse {
                dx: delta.0 as f32,
                dy: delta.1 as f32,
            });
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.scene {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => SceneConfig::default(),
    };
    tracing::info!(scene = %config.name, "walkspace-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(config)?);
    event_loop.run_app(&mut app)?;

    Ok(())
}
