use glam::{Quat, Vec3};
use serde::Serialize;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Largest absolute pitch. Looking straight up or down is allowed; flipping
/// over the pole is not.
pub const PITCH_LIMIT: f32 = FRAC_PI_2;

/// Canonical look angles.
///
/// Right-handed, +Y up. Yaw 0 faces +Z and positive yaw turns toward +X
/// (counter-clockwise seen from above). Positive pitch looks up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Orientation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Orientation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
        }
    }

    /// Unit facing vector, rebuilt from the angles on every call.
    pub fn facing(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(sy * cp, sp, cy * cp)
    }

    /// Yaw-then-pitch rotation taking local +Z onto [`Self::facing`]. No roll.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(-self.pitch)
    }

    /// Yaw folded into `[-π, π)` for display.
    pub fn wrapped_yaw(&self) -> f32 {
        (self.yaw + PI).rem_euclid(TAU) - PI
    }
}

/// Turns raw pointer deltas into look angles.
#[derive(Debug, Clone)]
pub struct OrientationIntegrator {
    orientation: Orientation,
}

impl OrientationIntegrator {
    pub fn new(initial: Orientation) -> Self {
        Self {
            orientation: initial,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Integrate one tick of pointer motion.
    ///
    /// Pointer right (`yaw_delta > 0`) turns right, pointer down
    /// (`pitch_delta > 0`) looks down. Pitch is clamped after accumulation.
    pub fn integrate(&mut self, yaw_delta: f32, pitch_delta: f32, sensitivity: f32) -> Orientation {
        if yaw_delta == 0.0 && pitch_delta == 0.0 {
            return self.orientation;
        }
        let o = &mut self.orientation;
        o.yaw -= yaw_delta * sensitivity;
        o.pitch = (o.pitch - pitch_delta * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        tracing::trace!(yaw = o.yaw, pitch = o.pitch, "orientation integrated");
        *o
    }

    pub fn reset(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }
}
