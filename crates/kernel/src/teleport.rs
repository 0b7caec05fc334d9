use glam::Vec3;
use tracing::info;
use walkspace_physics::PhysicsBody;

use crate::rig::{Camera, CameraRigSync};

/// Instantly relocate the player.
///
/// The body lands on `target` with zero velocity and the camera snaps with it
/// in the same call, so nothing renders a half-way frame.
pub struct TeleportService;

impl TeleportService {
    /// Returns the position the body left from.
    pub fn teleport(
        body: &mut dyn PhysicsBody,
        camera: &mut Camera,
        rig: &CameraRigSync,
        target: Vec3,
    ) -> Vec3 {
        let from = body.position();
        body.set_position(target);
        body.set_velocity(Vec3::ZERO);
        rig.snap(camera, target);
        info!(?from, to = ?target, "teleport");
        from
    }
}
