use glam::{Mat4, Vec3};

/// Clip planes for the projection; together they bound the visible depth
/// range of every mode.
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Pitch stays inside ±89° so the basis never degenerates at the poles.
const PITCH_LIMIT: f32 = 89.0 * std::f32::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Free-fly camera: a position plus an orthonormal right-handed basis
/// derived from yaw/pitch. Mutated only through [`Camera::move_by`] and
/// [`Camera::look_around`]; the matrices are pure functions of the state.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// World units per second.
    pub movement_speed: f32,
    /// Radians of yaw/pitch per unit of look input.
    pub look_sensitivity: f32,
}

impl Camera {
    pub fn new(fov: f32, movement_speed: f32, look_sensitivity: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
            world_up: Vec3::Y,
            // Looking down -Z.
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.0,
            fov,
            movement_speed,
            look_sensitivity,
        };
        camera.update_vectors();
        camera
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Translates the position along the basis, scaled by
    /// `movement_speed * delta_time`.
    pub fn move_by(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += velocity * self.front,
            CameraMovement::Backward => self.position -= velocity * self.front,
            CameraMovement::Right => self.position += velocity * self.right,
            CameraMovement::Left => self.position -= velocity * self.right,
            CameraMovement::Up => self.position += velocity * self.up,
            CameraMovement::Down => self.position -= velocity * self.up,
        }
    }

    /// Applies raw look input (e.g. mouse deltas), scaled by the
    /// sensitivity, and re-derives the basis.
    pub fn look_around(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw * self.look_sensitivity;
        self.pitch = (self.pitch + delta_pitch * self.look_sensitivity)
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width as f32 / height.max(1) as f32;
        Mat4::perspective_rh_gl(self.fov.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
    }

    fn update_vectors(&mut self) {
        self.front = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(45.0, 1.0, 0.002)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn initial_basis_looks_down_negative_z() {
        let camera = Camera::default();
        assert_relative_eq!(camera.front().x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.front().z, -1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.right().x, 1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.up().y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn forward_movement_scales_by_speed_and_delta() {
        let mut camera = Camera::default();
        camera.movement_speed = 2.0;
        camera.move_by(CameraMovement::Forward, 0.5);
        assert_relative_eq!(camera.position.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.position.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.position.z, -1.0, epsilon = 1e-6);
    }

    #[test]
    fn opposite_directions_cancel() {
        let mut camera = Camera::default();
        for (a, b) in [
            (CameraMovement::Forward, CameraMovement::Backward),
            (CameraMovement::Right, CameraMovement::Left),
            (CameraMovement::Up, CameraMovement::Down),
        ] {
            camera.move_by(a, 1.0);
            camera.move_by(b, 1.0);
        }
        assert_relative_eq!(camera.position.length(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn view_matrix_inverse_recovers_position() {
        let mut camera = Camera::default();
        camera.position = Vec3::new(1.5, -2.0, 4.25);
        camera.look_around(300.0, -120.0);

        let recovered = camera.view_matrix().inverse().transform_point3(Vec3::ZERO);
        assert_relative_eq!(recovered.x, camera.position.x, epsilon = 1e-4);
        assert_relative_eq!(recovered.y, camera.position.y, epsilon = 1e-4);
        assert_relative_eq!(recovered.z, camera.position.z, epsilon = 1e-4);
    }

    #[test]
    fn basis_stays_orthonormal_while_looking_around() {
        let mut camera = Camera::default();
        camera.look_around(1234.0, 567.0);
        camera.look_around(-432.0, 89.0);

        assert_relative_eq!(camera.front().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.right().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.up().length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(camera.front().dot(camera.right()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.front().dot(camera.up()), 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.right().dot(camera.up()), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn pitch_is_clamped_short_of_the_poles() {
        let mut camera = Camera::default();
        camera.look_sensitivity = 1.0;
        camera.look_around(0.0, 10.0);

        // Even with absurd input the front vector keeps a horizontal
        // component, so the right vector stays well-defined.
        assert!(camera.front().y < 1.0);
        assert!(camera.right().length() > 0.9);
    }

    #[test]
    fn projection_aspect_follows_resolution() {
        let camera = Camera::default();
        let projection = camera.projection_matrix(800, 600);

        let m00 = projection.col(0).x;
        let m11 = projection.col(1).y;
        assert_relative_eq!(m11 / m00, 800.0 / 600.0, epsilon = 1e-5);

        // Independent of any prior resolution: a pure function of the input.
        let again = camera.projection_matrix(1920, 1080);
        assert_relative_eq!(
            again.col(1).y / again.col(0).x,
            1920.0 / 1080.0,
            epsilon = 1e-5
        );
    }
}
