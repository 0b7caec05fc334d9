//! Physics Adapter: the boundary between the navigation core and a physics engine.
//!
//! # Invariants
//! - The core commands velocity and reads position; it never integrates motion itself.
//! - Bodies are owned by the world; scenes hold handles only.
//!
//! # Workaround
//! Provides a trait-based physics interface with a small sphere-on-planes
//! integrator as a workaround for a full engine. The trait is stable; swap in
//! a real engine without changing consumers.

mod body;
mod sphere;

pub use body::{BodyDesc, BodyHandle, PhysicsBody, PhysicsWorld};
pub use sphere::{SimplePhysics, SphereBody};

pub fn crate_info() -> &'static str {
    "walkspace-physics v0.1.0"
}
