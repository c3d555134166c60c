use crate::camera::{Camera, Projection};

/// Free-fly controller: mouse look plus WASD, Space up, LShift down.
#[derive(Debug, Copy, Clone)]
pub struct ClientCamera {
    camera: Camera,
    yaw: f32,
    pitch: f32,
}

impl ClientCamera {
    const MOVE_KEYS: [winit::event::VirtualKeyCode; 6] = [
        winit::event::VirtualKeyCode::W,
        winit::event::VirtualKeyCode::S,
        winit::event::VirtualKeyCode::D,
        winit::event::VirtualKeyCode::A,
        winit::event::VirtualKeyCode::Space,
        winit::event::VirtualKeyCode::LShift,
    ];

    const MOVE_SPEED: f32 = 5.4;
    const MOUSE_SENSITIVITY: f32 = 0.003;
    const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

    pub fn new(position: uv::Vec3, target: uv::Vec3, fovy: f32) -> Self {
        let camera = Camera::new(position, target, uv::Vec3::unit_y(), fovy, Projection::Perspective);
        let forward = camera.forward();
        Self {
            camera,
            yaw: forward.z.atan2(forward.x),
            pitch: forward.y.asin(),
        }
    }

    pub fn update(&mut self, state: &super::window::ClientState) {
        self.rotate(state.mouse_rel() * Self::MOUSE_SENSITIVITY);
        self.translate(
            state.move_vec(&Self::MOVE_KEYS) * Self::MOVE_SPEED * state.frame_elapsed().as_secs_f32(),
        );
    }

    /// `d.x` turns right, `d.y` looks down, both in radians.
    pub fn rotate(&mut self, d: uv::Vec2) {
        self.yaw = (self.yaw + d.x).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch - d.y).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.camera.target = self.camera.position + self.look_dir();
    }

    /// `d` is (forward, right, up) relative to the view direction; up is world up.
    pub fn translate(&mut self, d: uv::Vec3) {
        let forward = self.look_dir();
        let right = forward.cross(self.camera.up).normalized();
        let offset = forward * d.x + right * d.y + self.camera.up * d.z;
        self.camera.position += offset;
        self.camera.target = self.camera.position + forward;
    }

    fn look_dir(&self) -> uv::Vec3 {
        uv::Vec3::new(
            self.pitch.cos() * self.yaw.cos(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.sin(),
        )
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: uv::Vec3, b: uv::Vec3) -> bool {
        (a - b).mag() < 1e-4
    }

    fn demo() -> ClientCamera {
        ClientCamera::new(uv::Vec3::new(4.0, 4.0, 4.0), uv::Vec3::zero(), 60.0)
    }

    #[test]
    fn initial_orientation_matches_target() {
        let client = demo();
        assert!(close(client.look_dir(), client.camera().forward()));
    }

    #[test]
    fn forward_moves_toward_target() {
        let mut client = demo();
        let before = client.camera().position.mag();
        client.translate(uv::Vec3::new(1.0, 0.0, 0.0));
        assert!((before - client.camera().position.mag() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn vertical_movement_uses_world_up() {
        let mut client = demo();
        client.translate(uv::Vec3::new(0.0, 0.0, 2.0));
        assert!(close(client.camera().position, uv::Vec3::new(4.0, 6.0, 4.0)));
        assert!(close(client.camera().forward(), demo().camera().forward()));
    }

    #[test]
    fn pitch_is_clamped_short_of_the_pole() {
        let mut client = demo();
        client.rotate(uv::Vec2::new(0.0, -100.0));
        let forward = client.camera().forward();
        assert!(forward.y < 1.0 && forward.y > 0.99);
        client.rotate(uv::Vec2::new(0.0, 100.0));
        assert!(client.camera().forward().y > -1.0);
    }

    #[test]
    fn strafing_keeps_height() {
        let mut client = demo();
        client.rotate(uv::Vec2::new(0.7, 0.2));
        let y = client.camera().position.y;
        client.translate(uv::Vec3::new(0.0, 3.0, 0.0));
        assert!((client.camera().position.y - y).abs() < 1e-4);
    }
}
