//! Orbit-drag camera for the 3D viewer

use glam::{Mat4, Vec2, Vec3};

/// A ray in world space, used for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// 3D perspective camera with orbital controls
///
/// `position` and `target` are the authoritative transform. The orbital
/// parameters (`distance`, `yaw`, `pitch`) describe `position` relative to
/// `target` and are what mouse drag and scroll act on. Any code that moves
/// the camera programmatically goes through [`Camera3D::look_from`] so the
/// two views stay in agreement.
#[derive(Debug, Clone)]
pub struct Camera3D {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    // Orbital parameters
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Camera3D {
    pub fn new(aspect_ratio: f32) -> Self {
        let distance = 10.0;
        let yaw = 0.0f32;
        let pitch = 0.3f32;

        let position = Vec3::new(
            distance * pitch.cos() * yaw.sin(),
            distance * pitch.sin(),
            distance * pitch.cos() * yaw.cos(),
        );

        Self {
            position,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0f32.to_radians(),
            aspect_ratio,
            near: 0.1,
            far: 2000.0,
            distance,
            yaw,
            pitch,
            min_distance: 1.0,
            max_distance: 900.0,
        }
    }

    /// Update camera position based on orbital parameters
    pub fn update_orbital(&mut self) {
        self.position = self.target + Vec3::new(
            self.distance * self.pitch.cos() * self.yaw.sin(),
            self.distance * self.pitch.sin(),
            self.distance * self.pitch.cos() * self.yaw.cos(),
        );
    }

    /// Place the camera at `position` looking at `target`, re-deriving the
    /// orbital parameters so later drags continue from here.
    pub fn look_from(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;

        let offset = position - target;
        let distance = offset.length();
        if distance > f32::EPSILON {
            self.distance = distance;
            self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
            self.yaw = offset.x.atan2(offset.z);
        }
    }

    /// Orbit the camera around the target
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-1.5, 1.5);
        self.update_orbital();
    }

    /// Zoom in/out
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(self.min_distance, self.max_distance);
        self.update_orbital();
    }

    /// Distance between the eye and the look-at target.
    pub fn eye_distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Get the combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn update_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// World-space ray through a cursor position given in physical pixels,
    /// origin top-left.
    pub fn screen_ray(&self, cursor: Vec2, viewport: Vec2) -> Ray {
        let ndc = Vec2::new(
            2.0 * cursor.x / viewport.x.max(1.0) - 1.0,
            1.0 - 2.0 * cursor.y / viewport.y.max(1.0),
        );

        let inverse = self.view_projection().inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray {
            origin: self.position,
            direction: (far - near).normalize_or_zero(),
        }
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub position: [f32; 4],
}

impl CameraUniform {
    pub fn from_camera_3d(camera: &Camera3D) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            view: camera.view_matrix().to_cols_array_2d(),
            position: [camera.position.x, camera.position.y, camera.position.z, 1.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn look_from_round_trips_through_orbital_parameters() {
        let mut camera = Camera3D::new(1.5);
        let target = Vec3::new(3.0, -1.0, 7.0);
        let position = target + Vec3::new(4.0, 2.0, -5.0);
        camera.look_from(position, target);

        camera.update_orbital();
        assert!((camera.position - position).length() < 1e-4);
        assert!((camera.distance - (position - target).length()).abs() < 1e-5);
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut camera = Camera3D::new(1.0);
        camera.look_from(Vec3::new(0.0, 5.0, 20.0), Vec3::new(1.0, 0.0, 1.0));
        let before = camera.eye_distance();
        camera.orbit(0.7, -0.2);
        assert!((camera.eye_distance() - before).abs() < 1e-4);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut camera = Camera3D::new(1.0);
        camera.min_distance = 2.0;
        camera.zoom(100.0);
        assert!((camera.distance - 2.0).abs() < 1e-6);
        camera.zoom(-10_000.0);
        assert!((camera.distance - camera.max_distance).abs() < 1e-3);
    }

    #[test]
    fn center_of_screen_ray_points_at_target() {
        let mut camera = Camera3D::new(1.0);
        camera.look_from(Vec3::new(0.0, 0.0, 30.0), Vec3::ZERO);
        let ray = camera.screen_ray(Vec2::new(400.0, 400.0), Vec2::new(800.0, 800.0));
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-3);
        assert!(ray.at(30.0).length() < 1e-2);
    }
}
