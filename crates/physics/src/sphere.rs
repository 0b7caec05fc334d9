use glam::Vec3;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::body::{BodyDesc, BodyHandle, PhysicsBody, PhysicsWorld};

/// Sphere collider resting on horizontal planes.
#[derive(Debug, Clone)]
pub struct SphereBody {
    pub mass: f32,
    pub radius: f32,
    pub fixed_rotation: bool,
    position: Vec3,
    velocity: Vec3,
}

impl SphereBody {
    pub fn new(desc: BodyDesc) -> Self {
        Self {
            mass: desc.mass,
            radius: desc.radius,
            fixed_rotation: desc.fixed_rotation,
            position: desc.position,
            velocity: Vec3::ZERO,
        }
    }
}

impl PhysicsBody for SphereBody {
    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

/// Gravity plus a floor and a ceiling plane.
///
/// Holds weak references only: when a scene drops its handle the body
/// disappears from the world on the next step.
pub struct SimplePhysics {
    pub gravity: Vec3,
    pub ground_y: f32,
    pub ceiling_y: Option<f32>,
    bodies: Vec<Weak<RefCell<SphereBody>>>,
}

impl Default for SimplePhysics {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            ground_y: 0.0,
            ceiling_y: Some(100.0),
            bodies: Vec::new(),
        }
    }
}

impl SimplePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    fn integrate(&self, body: &mut SphereBody, dt: f32) {
        body.velocity += self.gravity * dt;
        body.position += body.velocity * dt;

        let floor = self.ground_y + body.radius;
        if body.position.y < floor {
            body.position.y = floor;
            body.velocity.y = body.velocity.y.max(0.0);
        }
        if let Some(ceiling) = self.ceiling_y {
            let top = ceiling - body.radius;
            if body.position.y > top {
                body.position.y = top;
                body.velocity.y = body.velocity.y.min(0.0);
            }
        }
    }
}

impl PhysicsWorld for SimplePhysics {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let body = Rc::new(RefCell::new(SphereBody::new(desc)));
        self.bodies.push(Rc::downgrade(&body));
        tracing::debug!(position = ?desc.position, radius = desc.radius, "body created");
        body
    }

    fn step(&mut self, dt: f32) {
        self.bodies.retain(|w| w.strong_count() > 0);
        for weak in &self.bodies {
            if let Some(body) = weak.upgrade() {
                self.integrate(&mut body.borrow_mut(), dt);
            }
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.iter().filter(|w| w.strong_count() > 0).count()
    }
}
