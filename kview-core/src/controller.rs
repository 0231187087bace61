//! Application state and the pipeline that keeps every view in sync.
//!
//! Input handlers mutate parameters through the [`Controller`], which only
//! marks the state dirty. [`Controller::flush`] then runs one full pass:
//! compose the matrix, transform the base geometry, redraw every viewport and
//! refresh the matrix text.

use nalgebra::Matrix4;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::matrix_display::{export_matrix, format_matrix, Clipboard};
use crate::transform::{Control, Transform, TransformParameters};
use crate::viewport::{MultiViewRenderer, ViewKind};

/// Everything derived from the current parameters
#[derive(Debug, Clone)]
pub struct AppState {
    pub params: TransformParameters,
    pub matrix: Matrix4<f32>,
    pub transformed: Geometry,
    pub matrix_text: String,
}

pub struct Controller {
    base: Geometry,
    state: AppState,
    renderer: MultiViewRenderer,
    dirty: bool,
    passes: u64,
}

impl Controller {
    /// Take ownership of the geometry and renderer and draw the first frame
    pub fn new(base: Geometry, renderer: MultiViewRenderer) -> Self {
        let params = TransformParameters::identity();
        let matrix = Transform::compose(&params);
        let state = AppState {
            params,
            matrix,
            transformed: base.clone(),
            matrix_text: format_matrix(&matrix),
        };

        let mut controller = Self {
            base,
            state,
            renderer,
            dirty: true,
            passes: 0,
        };
        controller.flush();
        controller
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn params(&self) -> &TransformParameters {
        &self.state.params
    }

    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.state.matrix
    }

    pub fn matrix_text(&self) -> &str {
        &self.state.matrix_text
    }

    pub fn base(&self) -> &Geometry {
        &self.base
    }

    pub fn renderer(&self) -> &MultiViewRenderer {
        &self.renderer
    }

    /// Number of pipeline passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn value(&self, control: Control) -> f32 {
        control.get(&self.state.params)
    }

    /// Slider input. Returns the stored value after clamping.
    pub fn set(&mut self, control: Control, value: f32) -> f32 {
        let stored = control.set(&mut self.state.params, value);
        self.dirty = true;
        stored
    }

    /// Move a slider by `steps` notches
    pub fn nudge(&mut self, control: Control, steps: i32) -> f32 {
        let next = control.nudged(self.value(control), steps);
        self.set(control, next)
    }

    /// Number-field input. Invalid text leaves the parameters untouched.
    pub fn submit_text(&mut self, control: Control, text: &str) -> Result<f32> {
        let value = control.parse(text)?;
        Ok(self.set(control, value))
    }

    /// Back to zero translation, zero rotation and unit scale
    pub fn reset(&mut self) {
        self.state.params.reset();
        self.dirty = true;
    }

    pub fn toggle_projections(&mut self) -> bool {
        self.dirty = true;
        self.renderer.toggle_projections()
    }

    pub fn set_projections_visible(&mut self, visible: bool) {
        self.renderer.set_projections_visible(visible);
        self.dirty = true;
    }

    pub fn reset_camera(&mut self) {
        self.renderer.reset_main_camera();
        self.dirty = true;
    }

    pub fn orbit_camera(&mut self, d_yaw: f32, d_pitch: f32) {
        self.renderer.orbit_main(d_yaw, d_pitch);
        self.dirty = true;
    }

    pub fn zoom_camera(&mut self, factor: f32) {
        self.renderer.zoom_main(factor);
        self.dirty = true;
    }

    pub fn resize_viewport(&mut self, kind: ViewKind, width: usize, height: usize) -> Result<()> {
        self.renderer.resize(kind, width, height)?;
        self.dirty = true;
        Ok(())
    }

    /// Run one pass if anything changed since the last one
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.update();
        true
    }

    /// Recompute everything from the current parameters
    pub fn update(&mut self) {
        self.state.matrix = Transform::compose(&self.state.params);
        self.state.transformed = self.base.transformed(&self.state.matrix);
        self.renderer.render_all(&self.state.transformed);
        self.state.matrix_text = format_matrix(&self.state.matrix);

        self.dirty = false;
        self.passes += 1;
        log::debug!(
            "pass {}: {} vertices through {:?}",
            self.passes,
            self.base.vertex_count(),
            self.state.params
        );
    }

    pub fn copy_matrix(&self, clipboard: &mut dyn Clipboard) -> Result<String> {
        export_matrix(&self.state.matrix, clipboard)
    }
}
