/// Transform parameters, matrix composition and vertex application
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::error::{Result, ViewError};

/// Rotation inputs are limited to `[-ROTATION_LIMIT, ROTATION_LIMIT]` degrees
pub const ROTATION_LIMIT: f32 = 180.0;

/// Translation, per-axis rotation (in degrees) and uniform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParameters {
    pub translation: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: f32,
}

impl TransformParameters {
    pub fn new(translation: Vector3<f32>, rotation: Vector3<f32>, scale: f32) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros(), 1.0)
    }

    pub fn reset(&mut self) {
        *self = Self::identity();
    }
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self::identity()
    }
}

/// The seven numeric inputs, each backed by a slider and a number field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    TranslateX,
    TranslateY,
    TranslateZ,
    RotateX,
    RotateY,
    RotateZ,
    Scale,
}

impl Control {
    pub const ALL: [Control; 7] = [
        Control::TranslateX,
        Control::TranslateY,
        Control::TranslateZ,
        Control::RotateX,
        Control::RotateY,
        Control::RotateZ,
        Control::Scale,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Control::TranslateX => "Translate X",
            Control::TranslateY => "Translate Y",
            Control::TranslateZ => "Translate Z",
            Control::RotateX => "Rotate X",
            Control::RotateY => "Rotate Y",
            Control::RotateZ => "Rotate Z",
            Control::Scale => "Scale",
        }
    }

    /// Identifier used by the web page for this control's elements
    pub fn element_id(self) -> &'static str {
        match self {
            Control::TranslateX => "translateX",
            Control::TranslateY => "translateY",
            Control::TranslateZ => "translateZ",
            Control::RotateX => "rotateX",
            Control::RotateY => "rotateY",
            Control::RotateZ => "rotateZ",
            Control::Scale => "scale",
        }
    }

    pub fn from_element_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.element_id() == id)
    }

    pub fn is_rotation(self) -> bool {
        matches!(self, Control::RotateX | Control::RotateY | Control::RotateZ)
    }

    /// Range covered by the slider. Only rotations clamp typed values too.
    pub fn slider_range(self) -> (f32, f32) {
        match self {
            Control::TranslateX | Control::TranslateY | Control::TranslateZ => (-3.0, 3.0),
            Control::RotateX | Control::RotateY | Control::RotateZ => {
                (-ROTATION_LIMIT, ROTATION_LIMIT)
            }
            Control::Scale => (0.1, 3.0),
        }
    }

    pub fn step(self) -> f32 {
        match self {
            Control::TranslateX | Control::TranslateY | Control::TranslateZ => 0.1,
            Control::RotateX | Control::RotateY | Control::RotateZ => 5.0,
            Control::Scale => 0.05,
        }
    }

    pub fn clamp_input(self, value: f32) -> f32 {
        if self.is_rotation() {
            value.clamp(-ROTATION_LIMIT, ROTATION_LIMIT)
        } else {
            value
        }
    }

    pub fn get(self, params: &TransformParameters) -> f32 {
        match self {
            Control::TranslateX => params.translation.x,
            Control::TranslateY => params.translation.y,
            Control::TranslateZ => params.translation.z,
            Control::RotateX => params.rotation.x,
            Control::RotateY => params.rotation.y,
            Control::RotateZ => params.rotation.z,
            Control::Scale => params.scale,
        }
    }

    /// Store `value` (clamped for rotations) and return what was stored
    pub fn set(self, params: &mut TransformParameters, value: f32) -> f32 {
        let value = self.clamp_input(value);
        let slot = match self {
            Control::TranslateX => &mut params.translation.x,
            Control::TranslateY => &mut params.translation.y,
            Control::TranslateZ => &mut params.translation.z,
            Control::RotateX => &mut params.rotation.x,
            Control::RotateY => &mut params.rotation.y,
            Control::RotateZ => &mut params.rotation.z,
            Control::Scale => &mut params.scale,
        };
        *slot = value;
        value
    }

    /// Value after moving the slider by `steps` notches from `current`
    pub fn nudged(self, current: f32, steps: i32) -> f32 {
        let (min, max) = self.slider_range();
        let value = current + self.step() * steps as f32;
        // Snap to the step grid so repeated nudges don't accumulate drift
        let snapped = (value / self.step()).round() * self.step();
        snapped.clamp(min, max)
    }

    /// Slider position of `value` as a fraction of the slider's range
    pub fn slider_fraction(self, value: f32) -> f32 {
        let (min, max) = self.slider_range();
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }

    /// Parse the contents of the number field
    pub fn parse(self, text: &str) -> Result<f32> {
        let invalid = || ViewError::InvalidInput {
            control: self.label(),
            input: text.to_string(),
        };
        let value: f32 = text.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        Ok(self.clamp_input(value))
    }
}

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation from per-axis angles in degrees. Applied to a column vector,
    /// Z acts first, then Y, then X.
    pub fn rotation_matrix(degrees: &Vector3<f32>) -> Matrix4<f32> {
        let radians = degrees.map(f32::to_radians);
        let rx = Matrix4::from_axis_angle(&Vector3::x_axis(), radians.x);
        let ry = Matrix4::from_axis_angle(&Vector3::y_axis(), radians.y);
        let rz = Matrix4::from_axis_angle(&Vector3::z_axis(), radians.z);

        rx * ry * rz
    }

    /// Create a translation matrix
    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Create a scale matrix
    pub fn scale_matrix(sx: f32, sy: f32, sz: f32) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz))
    }

    /// Model matrix for `params`: `T * Rx * Ry * Rz * S`.
    ///
    /// A vertex is scaled, rotated about Z, Y and X in that order, and then
    /// translated.
    pub fn compose(params: &TransformParameters) -> Matrix4<f32> {
        let t = params.translation;
        let s = params.scale;
        Self::translation_matrix(t.x, t.y, t.z)
            * Self::rotation_matrix(&params.rotation)
            * Self::scale_matrix(s, s, s)
    }

    /// Inverse-transpose of the upper 3x3, or `None` if it is singular
    pub fn normal_matrix(matrix: &Matrix4<f32>) -> Option<Matrix3<f32>> {
        let linear: Matrix3<f32> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        linear.try_inverse().map(|inverse| inverse.transpose())
    }

    /// Multiply `(x, y, z, 1)` by `matrix` and keep `xyz`. The matrix is
    /// affine, so `w` is dropped rather than divided out.
    pub fn apply_point(matrix: &Matrix4<f32>, point: &Point3<f32>) -> Point3<f32> {
        let h = matrix * point.to_homogeneous();
        Point3::new(h.x, h.y, h.z)
    }

    pub fn apply_points(matrix: &Matrix4<f32>, points: &[Point3<f32>]) -> Vec<Point3<f32>> {
        points.iter().map(|p| Self::apply_point(matrix, p)).collect()
    }
}
