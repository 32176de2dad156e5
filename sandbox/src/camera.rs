// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A free-flying camera driven by WASD and mouse look.

use lagoon_core::math::{Quat, Vec3};
use lagoon_data::Transform;
use std::f32::consts::FRAC_PI_2;
use winit::keyboard::KeyCode;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

#[derive(Debug, Default, Clone, Copy)]
struct Movement {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

/// Moves a camera node from keyboard and mouse input.
///
/// Mouse look is active while the right mouse button is held.
#[derive(Debug, Clone)]
pub struct CameraController {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    /// Units per second.
    pub speed: f32,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
    looking: bool,
    movement: Movement,
}

impl CameraController {
    /// A controller at `eye` facing `target`.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let forward = (target - eye).normalize_or_zero();
        Self {
            position: eye,
            yaw: (-forward.x).atan2(-forward.z),
            pitch: forward.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT),
            speed: 6.0,
            sensitivity: 0.003,
            looking: false,
            movement: Movement::default(),
        }
    }

    /// Updates the held movement keys. Returns `false` for keys it ignores.
    pub fn set_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        let slot = match code {
            KeyCode::KeyW | KeyCode::ArrowUp => &mut self.movement.forward,
            KeyCode::KeyS | KeyCode::ArrowDown => &mut self.movement.backward,
            KeyCode::KeyA | KeyCode::ArrowLeft => &mut self.movement.left,
            KeyCode::KeyD | KeyCode::ArrowRight => &mut self.movement.right,
            KeyCode::Space | KeyCode::KeyE => &mut self.movement.up,
            KeyCode::ShiftLeft | KeyCode::KeyQ => &mut self.movement.down,
            _ => return false,
        };
        *slot = pressed;
        true
    }

    /// Enables or disables mouse look.
    pub fn set_looking(&mut self, looking: bool) {
        self.looking = looking;
    }

    /// Turns the camera by a mouse delta in pixels.
    pub fn rotate(&mut self, dx: f64, dy: f64) {
        if !self.looking {
            return;
        }
        self.yaw -= dx as f32 * self.sensitivity;
        self.pitch = (self.pitch - dy as f32 * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Advances the position by `dt` seconds of held keys.
    pub fn update(&mut self, dt: f32) {
        let transform = self.transform();
        let m = self.movement;
        let axis = |positive: bool, negative: bool| positive as i32 as f32 - negative as i32 as f32;

        let direction = transform.forward() * axis(m.forward, m.backward)
            + transform.right() * axis(m.right, m.left)
            + Vec3::Y * axis(m.up, m.down);
        self.position += direction.normalize_or_zero() * self.speed * dt;
    }

    /// The camera node's world transform.
    pub fn transform(&self) -> Transform {
        Transform {
            translation: self.position,
            rotation: Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(self.pitch),
            scale: Vec3::ONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn controller() -> CameraController {
        CameraController::looking_at(Vec3::new(0.0, 4.0, 12.0), Vec3::ZERO)
    }

    #[test]
    fn starts_facing_the_target() {
        let expected = Vec3::new(0.0, -4.0, -12.0).normalize();
        let forward = controller().transform().forward();
        assert_relative_eq!(forward.x, expected.x, epsilon = 1e-5);
        assert_relative_eq!(forward.y, expected.y, epsilon = 1e-5);
        assert_relative_eq!(forward.z, expected.z, epsilon = 1e-5);
    }

    #[test]
    fn held_keys_move_along_the_view() {
        let mut camera = CameraController::looking_at(Vec3::ZERO, Vec3::NEG_Z);
        assert!(camera.set_key(KeyCode::KeyW, true));
        camera.update(0.5);
        assert_relative_eq!(camera.transform().translation.z, -3.0, epsilon = 1e-5);

        camera.set_key(KeyCode::KeyW, false);
        camera.set_key(KeyCode::KeyD, true);
        camera.update(1.0);
        assert_relative_eq!(camera.transform().translation.x, 6.0, epsilon = 1e-5);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut camera = controller();
        camera.set_key(KeyCode::Space, true);
        camera.set_key(KeyCode::ShiftLeft, true);
        camera.update(1.0);
        assert_eq!(camera.transform().translation, Vec3::new(0.0, 4.0, 12.0));
    }

    #[test]
    fn mouse_is_ignored_until_looking() {
        let mut camera = controller();
        let before = camera.transform().rotation;
        camera.rotate(120.0, 0.0);
        assert_eq!(camera.transform().rotation, before);

        camera.set_looking(true);
        camera.rotate(120.0, 0.0);
        assert_ne!(camera.transform().rotation, before);
    }

    #[test]
    fn pitch_stops_short_of_the_poles() {
        let mut camera = controller();
        camera.set_looking(true);
        camera.rotate(0.0, -100_000.0);
        assert!(camera.transform().forward().y < 1.0);
        assert!(camera.transform().forward().y > 0.99);
    }

    #[test]
    fn unrelated_keys_are_not_consumed() {
        assert!(!controller().set_key(KeyCode::KeyT, true));
    }
}
