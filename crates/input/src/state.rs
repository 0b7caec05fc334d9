use std::collections::BTreeSet;

use crate::bindings::{KeyBindings, MoveDirection};

/// Live movement and look input, buffered between ticks.
///
/// The four direction flags are derived from the set of held key codes, so
/// releasing `ArrowUp` while `KeyW` is still down keeps `forward` set.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Accumulated horizontal pointer motion since the last tick.
    pub yaw_delta: f32,
    /// Accumulated vertical pointer motion since the last tick.
    pub pitch_delta: f32,
    held: BTreeSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns `true` only for a fresh press, so OS key
    /// repeat never re-fires a hotkey.
    pub fn press(&mut self, code: &str, bindings: &KeyBindings) -> bool {
        let fresh = self.held.insert(code.to_string());
        if fresh && bindings.direction(code).is_some() {
            self.refresh(bindings);
        }
        fresh
    }

    /// Record a key release.
    pub fn release(&mut self, code: &str, bindings: &KeyBindings) {
        if self.held.remove(code) && bindings.direction(code).is_some() {
            self.refresh(bindings);
        }
    }

    /// Accumulate raw pointer motion.
    pub fn accumulate_look(&mut self, dx: f32, dy: f32) {
        self.yaw_delta += dx;
        self.pitch_delta += dy;
    }

    /// Read and reset the look deltas.
    pub fn take_look_delta(&mut self) -> (f32, f32) {
        let out = (self.yaw_delta, self.pitch_delta);
        self.yaw_delta = 0.0;
        self.pitch_delta = 0.0;
        out
    }

    /// Drop every held key (focus loss, visibility change).
    pub fn clear_keys(&mut self) {
        self.held.clear();
        self.forward = false;
        self.backward = false;
        self.left = false;
        self.right = false;
    }

    pub fn any_movement(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    fn refresh(&mut self, bindings: &KeyBindings) {
        let held = |dir| {
            bindings
                .codes_for(dir)
                .iter()
                .any(|c| self.held.contains(c))
        };
        let (f, b, l, r) = (
            held(MoveDirection::Forward),
            held(MoveDirection::Backward),
            held(MoveDirection::Left),
            held(MoveDirection::Right),
        );
        self.forward = f;
        self.backward = b;
        self.left = l;
        self.right = r;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release_drive_flags() {
        let b = KeyBindings::default();
        let mut s = InputState::new();
        assert!(s.press("KeyW", &b));
        assert!(s.forward);
        s.release("KeyW", &b);
        assert!(!s.forward);
    }

    #[test]
    fn repeat_press_is_not_fresh() {
        let b = KeyBindings::default();
        let mut s = InputState::new();
        assert!(s.press("KeyH", &b));
        assert!(!s.press("KeyH", &b));
        s.release("KeyH", &b);
        assert!(s.press("KeyH", &b));
    }

    #[test]
    fn alias_keys_share_a_direction() {
        let b = KeyBindings::default();
        let mut s = InputState::new();
        s.press("KeyW", &b);
        s.press("ArrowUp", &b);
        s.release("ArrowUp", &b);
        assert!(s.forward);
        s.release("KeyW", &b);
        assert!(!s.forward);
    }

    #[test]
    fn look_delta_is_read_and_reset() {
        let mut s = InputState::new();
        s.accumulate_look(3.0, -1.0);
        s.accumulate_look(2.0, 4.0);
        assert_eq!(s.take_look_delta(), (5.0, 3.0));
        assert_eq!(s.take_look_delta(), (0.0, 0.0));
    }

    #[test]
    fn clear_keys_stops_movement() {
        let b = KeyBindings::default();
        let mut s = InputState::new();
        s.press("KeyW", &b);
        s.press("KeyD", &b);
        assert!(s.any_movement());
        s.clear_keys();
        assert!(!s.any_movement());
        assert!(s.press("KeyW", &b));
    }

    #[test]
    fn unbound_keys_do_not_move() {
        let b = KeyBindings::default();
        let mut s = InputState::new();
        s.press("KeyQ", &b);
        assert!(!s.any_movement());
        assert!(!s.press("KeyQ", &b));
    }
}
