//! Rendering adapter: what a renderer may read from a scene.
//!
//! # Invariants
//! - Renderers never mutate the scene; the camera is written by the kernel only.
//! - A view is rebuilt from the scene every frame.
//!
//! # Workaround
//! Scene geometry is out of scope here. The debug text renderer stands in for
//! a real backend; the desktop app clears a wgpu frame and draws the HUD over it.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderCamera, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "walkspace-render v0.1.0"
}
