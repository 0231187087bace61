//! Static configuration shared by every front end.

use std::time::Duration;

use nalgebra::Vector3;

use crate::geometry::Rgba;

/// Dimensions of the letter K, in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterDimensions {
    pub thickness: f32,
    pub bar_width: f32,
    pub vertical_height: f32,
    pub arm_length: f32,
    pub arm_thickness: f32,
}

impl Default for LetterDimensions {
    fn default() -> Self {
        Self {
            thickness: 0.35,
            bar_width: 0.35,
            vertical_height: 2.2,
            arm_length: 1.6,
            arm_thickness: 0.28,
        }
    }
}

/// Camera, lighting and presentation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Vertical field of view of the main view, in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from every camera to the origin.
    pub camera_distance: f32,
    /// Vertical half-extent of the orthographic projections.
    pub ortho_half_extent: f32,
    /// Directional light, given in view space.
    pub light_dir: Vector3<f32>,
    pub ambient: f32,
    pub clear_color: Rgba,
    pub tint_xy: Rgba,
    pub tint_xz: Rgba,
    pub tint_yz: Rgba,
    pub axis_length: f32,
    pub resize_debounce: Duration,
    pub letter: LetterDimensions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            camera_distance: 6.0,
            ortho_half_extent: 2.5,
            light_dir: Vector3::new(0.5, 0.8, 0.6),
            ambient: 0.18,
            clear_color: [0.08, 0.09, 0.12, 1.0],
            tint_xy: [1.0, 1.0, 0.0, 1.0],
            tint_xz: [1.0, 0.0, 1.0, 1.0],
            tint_yz: [0.0, 1.0, 1.0, 1.0],
            axis_length: 2.0,
            resize_debounce: Duration::from_millis(120),
            letter: LetterDimensions::default(),
        }
    }
}
