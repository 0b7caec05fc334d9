use glam::{Vec2, Vec3};
use walkspace_input::InputState;
use walkspace_physics::PhysicsBody;

/// Horizontal forward and right vectors for a yaw. Pitch never enters here:
/// looking at the sky does not slow the walk.
pub fn basis(yaw: f32) -> (Vec3, Vec3) {
    let (s, c) = yaw.sin_cos();
    let forward = Vec3::new(s, 0.0, c);
    // forward x +Y
    let right = Vec3::new(-c, 0.0, s);
    (forward, right)
}

/// Velocity command for one tick.
///
/// The XZ part comes from the held keys in the facing frame, normalized so a
/// diagonal is no faster than a single key. The Y part is copied from
/// `current` so gravity keeps acting. With no key held the XZ part is exactly
/// zero, because body velocity persists between ticks.
pub fn compute_velocity(input: &InputState, facing_yaw: f32, speed: f32, current: Vec3) -> Vec3 {
    let axis = |pos: bool, neg: bool| (pos as i8 - neg as i8) as f32;
    let mut mv = Vec2::new(axis(input.right, input.left), axis(input.forward, input.backward));
    if mv == Vec2::ZERO {
        return Vec3::new(0.0, current.y, 0.0);
    }
    mv = mv.normalize() * speed;
    let (forward, right) = basis(facing_yaw);
    let planar = right * mv.x + forward * mv.y;
    Vec3::new(planar.x, current.y, planar.z)
}

/// Drives the player body from key state.
#[derive(Debug, Clone)]
pub struct LocomotionController {
    pub speed: f32,
}

impl LocomotionController {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Command the body for this tick. Calls `set_velocity` exactly once and
    /// returns what was sent.
    pub fn apply(&self, input: &InputState, facing_yaw: f32, body: &mut dyn PhysicsBody) -> Vec3 {
        let v = compute_velocity(input, facing_yaw, self.speed, body.velocity());
        body.set_velocity(v);
        v
    }
}
