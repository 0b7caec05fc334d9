use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;

/// A dynamic rigid body as seen from the navigation core.
pub trait PhysicsBody {
    /// Replace the body's linear velocity.
    fn set_velocity(&mut self, velocity: Vec3);

    /// Current linear velocity, including whatever gravity has added.
    fn velocity(&self) -> Vec3;

    /// Authoritative position of the body's center.
    fn position(&self) -> Vec3;

    /// Move the body without integrating through the space in between.
    fn set_position(&mut self, position: Vec3);
}

/// Shared, single-threaded reference to a body owned by a physics world.
pub type BodyHandle = Rc<RefCell<dyn PhysicsBody>>;

/// Parameters for creating the player body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub mass: f32,
    pub position: Vec3,
    pub radius: f32,
    /// Collider never rotates; orientation is owned by the camera rig.
    pub fixed_rotation: bool,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self {
            mass: 1.0,
            position: Vec3::ZERO,
            radius: 0.5,
            fixed_rotation: true,
        }
    }
}

/// A physics engine that can host bodies and advance time.
pub trait PhysicsWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Advance the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    /// Number of bodies still alive in the world.
    fn body_count(&self) -> usize;
}
