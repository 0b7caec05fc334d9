use glam::{Quat, Vec3};
use serde::Serialize;

use crate::orientation::Orientation;

/// The render camera the core writes every tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Camera {
    pub position: Vec3,
    pub orientation: Quat,
    pub fov_degrees: f32,
}

impl Camera {
    pub fn new(position: Vec3, fov_degrees: f32) -> Self {
        Self {
            position,
            orientation: Quat::IDENTITY,
            fov_degrees,
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::Z
    }
}

/// Keeps the camera at eye height above the physics body.
///
/// The camera is a follower, never a body of its own: position comes from
/// physics, rotation from the orientation integrator.
#[derive(Debug, Clone)]
pub struct CameraRigSync {
    pub eye_height: f32,
    /// Fraction of the remaining gap closed each tick, in (0, 1].
    ///
    /// Only 1 keeps the camera on the body every tick. Anything lower trades
    /// that for softer motion: the camera trails a moving body by several
    /// ticks and only converges once the body stops.
    pub smoothing: f32,
}

impl CameraRigSync {
    pub fn new(eye_height: f32, smoothing: f32) -> Self {
        Self {
            eye_height,
            smoothing,
        }
    }

    pub fn eye_offset(&self) -> Vec3 {
        Vec3::new(0.0, self.eye_height, 0.0)
    }

    /// Where the camera wants to be for a body at `body_position`.
    pub fn target(&self, body_position: Vec3) -> Vec3 {
        body_position + self.eye_offset()
    }

    /// Per-tick follow. The camera ends between where it was and the target,
    /// never past it.
    pub fn sync(&self, camera: &mut Camera, body_position: Vec3, orientation: &Orientation) {
        let target = self.target(body_position);
        camera.position = if self.smoothing >= 1.0 {
            target
        } else {
            camera.position.lerp(target, self.smoothing)
        };
        camera.orientation = orientation.rotation();
    }

    /// Place the camera exactly on target, skipping interpolation.
    pub fn snap(&self, camera: &mut Camera, body_position: Vec3) {
        camera.position = self.target(body_position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_sync_copies_position_plus_eye() {
        let rig = CameraRigSync::new(1.0, 1.0);
        let mut cam = Camera::new(Vec3::ZERO, 45.0);
        rig.sync(&mut cam, Vec3::new(2.0, 0.5, -3.0), &Orientation::default());
        assert_eq!(cam.position, Vec3::new(2.0, 1.5, -3.0));
    }

    #[test]
    fn smoothed_sync_never_overshoots() {
        let rig = CameraRigSync::new(1.0, 0.25);
        let mut cam = Camera::new(Vec3::new(0.0, 1.0, 0.0), 45.0);
        let body = Vec3::new(0.0, 0.0, 8.0);
        let mut last = cam.position.z;
        for _ in 0..50 {
            rig.sync(&mut cam, body, &Orientation::default());
            assert!(cam.position.z >= last);
            assert!(cam.position.z <= 8.0);
            last = cam.position.z;
        }
        assert!((cam.position.z - 8.0).abs() < 1e-3);
    }

    #[test]
    fn only_full_smoothing_tracks_a_moving_body() {
        let eye = Vec3::new(0.0, 1.0, 0.0);
        let direct = CameraRigSync::new(1.0, 1.0);
        let soft = CameraRigSync::new(1.0, 0.25);
        let mut a = Camera::new(eye, 45.0);
        let mut b = Camera::new(eye, 45.0);
        let mut body = Vec3::ZERO;
        for _ in 0..10 {
            body.z += 0.1;
            direct.sync(&mut a, body, &Orientation::default());
            soft.sync(&mut b, body, &Orientation::default());
            assert_eq!(a.position, body + eye);
        }
        // Lag approaches three steps of motion.
        let gap = (body.z - b.position.z).abs();
        assert!(gap > 0.2, "gap {gap}");
    }

    #[test]
    fn rotation_comes_from_orientation() {
        let rig = CameraRigSync::new(1.0, 1.0);
        let mut cam = Camera::new(Vec3::ZERO, 45.0);
        let o = Orientation::new(0.8, -0.3);
        rig.sync(&mut cam, Vec3::ZERO, &o);
        assert!((cam.forward() - o.facing()).length() < 1e-5);
    }

    #[test]
    fn snap_ignores_smoothing() {
        let rig = CameraRigSync::new(1.2, 0.1);
        let mut cam = Camera::new(Vec3::ZERO, 45.0);
        rig.snap(&mut cam, Vec3::new(10.0, 0.5, 10.0));
        assert_eq!(cam.position, Vec3::new(10.0, 1.7, 10.0));
    }
}
