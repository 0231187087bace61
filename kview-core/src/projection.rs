/// Cameras and projections for the main view and the axis-aligned views
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::ViewerConfig;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Pitch limit for the orbiting main camera, just short of the poles
const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;
const MIN_DISTANCE: f32 = 1.0;

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
    /// Half-extent on both axes in orthographic mode
    pub ortho_half_extent: f32,
    home: Point3<f32>,
}

impl Camera {
    /// Perspective camera on +Z looking at the origin
    pub fn perspective(config: &ViewerConfig, width: usize, height: usize) -> Self {
        let position = Point3::new(0.0, 0.0, config.camera_distance);
        Self {
            position,
            target: Point3::origin(),
            up: Vector3::y(),
            fov: config.fov_degrees.to_radians(),
            aspect: aspect_ratio(width, height),
            near: config.near,
            far: config.far,
            mode: ProjectionMode::Perspective,
            ortho_half_extent: config.ortho_half_extent,
            home: position,
        }
    }

    /// Orthographic camera looking at the origin from `direction`
    pub fn orthographic(
        config: &ViewerConfig,
        direction: Vector3<f32>,
        up: Vector3<f32>,
        width: usize,
        height: usize,
    ) -> Self {
        let position = Point3::from(direction.normalize() * config.camera_distance);
        Self {
            position,
            up,
            mode: ProjectionMode::Orthographic,
            home: position,
            ..Self::perspective(config, width, height)
        }
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.aspect = aspect_ratio(width, height);
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let e = self.ortho_half_extent;
                Matrix4::new_orthographic(-e, e, -e, e, self.near, self.far)
            }
        }
    }

    /// Translation that backs the camera away from its target. The light
    /// rides on this rig, so its direction is fixed in view space.
    pub fn rig_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(0.0, 0.0, -self.distance()))
    }

    /// Carry a light direction into view space
    pub fn light_to_view(&self, light: &Vector3<f32>) -> Vector3<f32> {
        let rig = self.rig_matrix();
        (rig.fixed_view::<3, 3>(0, 0) * light).normalize()
    }

    /// Orbit around the target by yaw and pitch deltas, in radians
    pub fn orbit(&mut self, d_yaw: f32, d_pitch: f32) {
        let offset = self.position - self.target;
        let distance = offset.norm();
        let yaw = offset.x.atan2(offset.z) + d_yaw;
        let pitch = ((offset.y / distance).asin() + d_pitch).clamp(-MAX_PITCH, MAX_PITCH);

        self.position = self.target
            + Vector3::new(
                distance * pitch.cos() * yaw.sin(),
                distance * pitch.sin(),
                distance * pitch.cos() * yaw.cos(),
            );
    }

    /// Move towards (`factor < 1`) or away from the target
    pub fn zoom(&mut self, factor: f32) {
        let offset = self.position - self.target;
        let max_distance = MIN_DISTANCE.max(self.far * 0.5);
        let distance = (offset.norm() * factor).clamp(MIN_DISTANCE, max_distance);
        self.position = self.target + offset.normalize() * distance;
    }

    /// Return to the pose the camera was created with
    pub fn reset(&mut self) {
        self.position = self.home;
    }

    /// Project a 3D point to 2D screen space
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection_matrix() * self.view_matrix() * model_matrix;
        let clip = mvp * point.to_homogeneous();

        // Behind the camera or on its plane
        if clip.w < 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z.abs() > 1.0 {
            return None;
        }

        // Convert to screen space
        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(&ViewerConfig::default(), 800, 600)
    }
}

fn aspect_ratio(width: usize, height: usize) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::perspective(&ViewerConfig::default(), 800, 600);
        assert_eq!(camera.mode, ProjectionMode::Perspective);
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_relative_eq!(camera.fov, std::f32::consts::FRAC_PI_4, epsilon = 1e-6);
    }

    #[test]
    fn test_home_view_is_pure_translation() {
        let camera = Camera::default();
        assert_relative_eq!(
            camera.view_matrix(),
            Matrix4::new_translation(&Vector3::new(0.0, 0.0, -6.0)),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_origin_projects_to_centre() {
        let camera = Camera::default();
        let (x, y, _) = camera
            .project_to_screen(&Point3::origin(), &Matrix4::identity(), 800, 600)
            .unwrap();
        assert_relative_eq!(x, 400.0, epsilon = 1e-3);
        assert_relative_eq!(y, 300.0, epsilon = 1e-3);
    }

    #[test]
    fn test_point_behind_camera_is_rejected() {
        let camera = Camera::default();
        let behind = Point3::new(0.0, 0.0, 10.0);
        assert!(camera
            .project_to_screen(&behind, &Matrix4::identity(), 800, 600)
            .is_none());
    }

    #[test]
    fn test_orthographic_extent() {
        let config = ViewerConfig::default();
        let camera = Camera::orthographic(&config, Vector3::z(), Vector3::y(), 100, 100);
        // 2.0 out of a 2.5 half-extent lands a tenth of the way down
        let point = Point3::new(0.0, 2.0, 0.0);
        let (x, y, _) = camera
            .project_to_screen(&point, &Matrix4::identity(), 100, 100)
            .unwrap();
        assert_relative_eq!(x, 50.0, epsilon = 1e-3);
        assert_relative_eq!(y, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_orthographic_extent_ignores_aspect() {
        let config = ViewerConfig::default();
        let camera = Camera::orthographic(&config, Vector3::z(), Vector3::y(), 400, 300);
        // Half of the 2.5 extent lands halfway to the edge on either axis
        let point = Point3::new(1.25, 1.25, 0.0);
        let (x, y, _) = camera
            .project_to_screen(&point, &Matrix4::identity(), 400, 300)
            .unwrap();
        assert_relative_eq!(x, 300.0, epsilon = 1e-3);
        assert_relative_eq!(y, 75.0, epsilon = 1e-3);
    }

    #[test]
    fn test_orbit_keeps_distance_and_reset_restores() {
        let mut camera = Camera::default();
        camera.orbit(0.7, 0.3);
        assert_relative_eq!(camera.distance(), 6.0, epsilon = 1e-4);
        assert!(camera.position.x.abs() > 0.1);

        camera.orbit(0.0, 10.0);
        assert!(camera.position.y < 6.0);

        camera.reset();
        assert_eq!(camera.position, Point3::new(0.0, 0.0, 6.0));
    }

    #[test]
    fn test_zoom_is_bounded() {
        let mut camera = Camera::default();
        camera.zoom(0.01);
        assert_relative_eq!(camera.distance(), MIN_DISTANCE, epsilon = 1e-5);
    }

    #[test]
    fn test_zoom_with_short_frustum() {
        let config = ViewerConfig {
            far: 1.5,
            ..ViewerConfig::default()
        };
        let mut camera = Camera::perspective(&config, 100, 100);
        camera.zoom(0.9);
        assert_relative_eq!(camera.distance(), MIN_DISTANCE, epsilon = 1e-5);
        camera.zoom(3.0);
        assert_relative_eq!(camera.distance(), MIN_DISTANCE, epsilon = 1e-5);
    }

    #[test]
    fn test_light_stays_fixed_in_view_space() {
        let mut camera = Camera::default();
        let light = Vector3::new(0.5, 0.8, 0.6);
        let before = camera.light_to_view(&light);
        camera.orbit(1.0, 0.2);
        assert_relative_eq!(camera.light_to_view(&light), before, epsilon = 1e-6);
        assert_relative_eq!(before, light.normalize(), epsilon = 1e-6);
    }
}
