//! Viewports and the renderer that redraws them together.
//!
//! Every viewport owns its camera, framebuffer and shading program. A
//! viewport whose target could not be created is left out entirely; one whose
//! program failed to compile is kept but never draws.

use nalgebra::Vector3;

use crate::config::ViewerConfig;
use crate::error::{Result, ViewError};
use crate::geometry::{Geometry, Rgba, Shape};
use crate::projection::Camera;
use crate::raster::{Framebuffer, LambertProgram, Uniforms};

/// Which view a viewport shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Perspective, free camera
    Main,
    /// Orthographic, looking down -Z
    Xy,
    /// Orthographic, looking along +Y with Z up
    Xz,
    /// Orthographic, looking along +X with Z to the right
    Yz,
}

impl ViewKind {
    pub const ALL: [ViewKind; 4] = [ViewKind::Main, ViewKind::Xy, ViewKind::Xz, ViewKind::Yz];
    pub const PROJECTIONS: [ViewKind; 3] = [ViewKind::Xy, ViewKind::Xz, ViewKind::Yz];

    pub fn label(self) -> &'static str {
        match self {
            ViewKind::Main => "main",
            ViewKind::Xy => "xy",
            ViewKind::Xz => "xz",
            ViewKind::Yz => "yz",
        }
    }

    /// Id of the canvas element hosting this view on the web page
    pub fn element_id(self) -> &'static str {
        match self {
            ViewKind::Main => "mainView",
            ViewKind::Xy => "viewXY",
            ViewKind::Xz => "viewXZ",
            ViewKind::Yz => "viewYZ",
        }
    }

    pub fn is_projection(self) -> bool {
        self != ViewKind::Main
    }

    pub fn tint(self, config: &ViewerConfig) -> Option<Rgba> {
        match self {
            ViewKind::Main => None,
            ViewKind::Xy => Some(config.tint_xy),
            ViewKind::Xz => Some(config.tint_xz),
            ViewKind::Yz => Some(config.tint_yz),
        }
    }

    pub fn camera(self, config: &ViewerConfig, width: usize, height: usize) -> Camera {
        let ortho = |eye, up| Camera::orthographic(config, eye, up, width, height);
        match self {
            ViewKind::Main => Camera::perspective(config, width, height),
            ViewKind::Xy => ortho(Vector3::z(), Vector3::y()),
            ViewKind::Xz => ortho(-Vector3::y(), Vector3::z()),
            ViewKind::Yz => ortho(-Vector3::x(), Vector3::y()),
        }
    }
}

/// Requested size of one viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTarget {
    pub kind: ViewKind,
    pub width: usize,
    pub height: usize,
}

impl RenderTarget {
    pub fn new(kind: ViewKind, width: usize, height: usize) -> Self {
        Self {
            kind,
            width,
            height,
        }
    }
}

/// Per-view state: camera, render target and shading program
#[derive(Debug, Clone)]
pub struct Viewport {
    kind: ViewKind,
    camera: Camera,
    framebuffer: Framebuffer,
    program: Option<LambertProgram>,
    tint: Option<Rgba>,
    clear_color: Rgba,
}

impl Viewport {
    pub fn new(kind: ViewKind, width: usize, height: usize, config: &ViewerConfig) -> Result<Self> {
        check_size(kind, width, height)?;

        let program = match LambertProgram::compile(&config.light_dir, config.ambient) {
            Ok(program) => Some(program),
            Err(e) => {
                log::error!("viewport '{}' disabled: {e}", kind.label());
                None
            }
        };

        let mut framebuffer = Framebuffer::new(width, height);
        framebuffer.clear(config.clear_color);

        Ok(Self {
            kind,
            camera: kind.camera(config, width, height),
            framebuffer,
            program,
            tint: kind.tint(config),
            clear_color: config.clear_color,
        })
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn tint(&self) -> Option<Rgba> {
        self.tint
    }

    /// False once the shading program failed to compile
    pub fn is_enabled(&self) -> bool {
        self.program.is_some()
    }

    /// Reallocate the render target. The old target is kept on failure.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        check_size(self.kind, width, height)?;
        if (width, height) != (self.framebuffer.width(), self.framebuffer.height()) {
            self.framebuffer = Framebuffer::new(width, height);
            self.framebuffer.clear(self.clear_color);
            self.camera.set_viewport(width, height);
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.framebuffer.clear(self.clear_color);
    }

    /// Clear, then draw the axes gizmo followed by the shape
    pub fn draw(&mut self, geometry: &Geometry) {
        let Some(program) = self.program else {
            return;
        };
        self.framebuffer.clear(self.clear_color);

        let uniforms = Uniforms {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            light_dir: self.camera.light_to_view(program.light_dir()),
            tint: self.tint,
        };
        let mvp = uniforms.projection * uniforms.view;

        self.framebuffer.draw_wireframe(&geometry.axes, &mvp, None);
        match &geometry.shape {
            Shape::Solid(mesh) => self.framebuffer.draw_mesh(mesh, &program, &uniforms),
            Shape::Wireframe(wireframe) => {
                self.framebuffer.draw_wireframe(wireframe, &mvp, self.tint)
            }
        }
    }
}

fn check_size(kind: ViewKind, width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ViewError::ContextUnavailable {
            view: kind.label().to_string(),
            reason: format!("cannot allocate a {width}x{height} render target"),
        });
    }
    Ok(())
}

/// The main view plus the three projections, always redrawn as one pass
#[derive(Debug, Clone)]
pub struct MultiViewRenderer {
    viewports: Vec<Viewport>,
    show_projections: bool,
}

impl MultiViewRenderer {
    /// Create a viewport per target, skipping (and logging) those that fail
    pub fn new(config: &ViewerConfig, targets: &[RenderTarget]) -> Self {
        let viewports = targets
            .iter()
            .filter_map(|t| match Viewport::new(t.kind, t.width, t.height, config) {
                Ok(viewport) => Some(viewport),
                Err(e) => {
                    log::error!("{e}; skipping viewport");
                    None
                }
            })
            .collect();

        Self {
            viewports,
            show_projections: true,
        }
    }

    /// All four views at the same size
    pub fn uniform(config: &ViewerConfig, width: usize, height: usize) -> Self {
        let targets: Vec<RenderTarget> = ViewKind::ALL
            .iter()
            .map(|&kind| RenderTarget::new(kind, width, height))
            .collect();
        Self::new(config, &targets)
    }

    /// Redraw every active viewport. Hidden projections are cleared and
    /// disabled viewports are left alone.
    pub fn render_all(&mut self, geometry: &Geometry) {
        let show_projections = self.show_projections;
        for viewport in &mut self.viewports {
            if !viewport.is_enabled() {
                continue;
            }
            if viewport.kind().is_projection() && !show_projections {
                viewport.clear();
            } else {
                viewport.draw(geometry);
            }
        }
    }

    pub fn viewports(&self) -> &[Viewport] {
        &self.viewports
    }

    pub fn viewport(&self, kind: ViewKind) -> Option<&Viewport> {
        self.viewports.iter().find(|v| v.kind() == kind)
    }

    pub fn viewport_mut(&mut self, kind: ViewKind) -> Option<&mut Viewport> {
        self.viewports.iter_mut().find(|v| v.kind() == kind)
    }

    pub fn resize(&mut self, kind: ViewKind, width: usize, height: usize) -> Result<()> {
        self.viewport_mut(kind)
            .ok_or_else(|| ViewError::MissingViewport(kind.label().to_string()))?
            .resize(width, height)
    }

    pub fn projections_visible(&self) -> bool {
        self.show_projections
    }

    pub fn set_projections_visible(&mut self, visible: bool) {
        self.show_projections = visible;
    }

    /// Flip projection visibility and return the new state
    pub fn toggle_projections(&mut self) -> bool {
        self.show_projections = !self.show_projections;
        self.show_projections
    }

    pub fn orbit_main(&mut self, d_yaw: f32, d_pitch: f32) {
        if let Some(main) = self.viewport_mut(ViewKind::Main) {
            main.camera_mut().orbit(d_yaw, d_pitch);
        }
    }

    pub fn zoom_main(&mut self, factor: f32) {
        if let Some(main) = self.viewport_mut(ViewKind::Main) {
            main.camera_mut().zoom(factor);
        }
    }

    /// Only the main view has a movable camera
    pub fn reset_main_camera(&mut self) {
        if let Some(main) = self.viewport_mut(ViewKind::Main) {
            main.camera_mut().reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix4, Point3};

    fn render(config: &ViewerConfig) -> MultiViewRenderer {
        let mut renderer = MultiViewRenderer::uniform(config, 64, 64);
        renderer.render_all(&Geometry::solid(config));
        renderer
    }

    #[test]
    fn test_every_view_draws_the_letter() {
        let config = ViewerConfig::default();
        let renderer = render(&config);
        assert_eq!(renderer.viewports().len(), 4);
        for viewport in renderer.viewports() {
            assert!(
                viewport.framebuffer().coverage(config.clear_color) > 50,
                "{} view is empty",
                viewport.kind().label()
            );
        }
    }

    #[test]
    fn test_projection_tint() {
        let config = ViewerConfig::default();
        let renderer = render(&config);
        let xy = renderer.viewport(ViewKind::Xy).unwrap().framebuffer();
        // Upper part of the stem; its shaded fill keeps the yellow hue
        let [r, g, b, _] = xy.pixel(20, 20);
        assert!(r > 0);
        assert_eq!(r, g);
        assert_eq!(b, 0);
    }

    #[test]
    fn test_zero_sized_target_is_skipped() {
        let config = ViewerConfig::default();
        let targets = [
            RenderTarget::new(ViewKind::Main, 32, 32),
            RenderTarget::new(ViewKind::Xy, 0, 32),
            RenderTarget::new(ViewKind::Xz, 32, 32),
        ];
        let mut renderer = MultiViewRenderer::new(&config, &targets);
        renderer.render_all(&Geometry::solid(&config));

        assert!(renderer.viewport(ViewKind::Xy).is_none());
        assert!(renderer.viewport(ViewKind::Xz).is_some());
        assert!(matches!(
            renderer.resize(ViewKind::Yz, 10, 10),
            Err(ViewError::MissingViewport(_))
        ));
    }

    #[test]
    fn test_failed_program_disables_without_panicking() {
        let config = ViewerConfig {
            light_dir: Vector3::zeros(),
            ..ViewerConfig::default()
        };
        let renderer = render(&config);
        assert_eq!(renderer.viewports().len(), 4);
        assert!(renderer.viewports().iter().all(|v| !v.is_enabled()));
        assert!(renderer
            .viewports()
            .iter()
            .all(|v| v.framebuffer().coverage(config.clear_color) == 0));
    }

    #[test]
    fn test_disabled_viewports_are_skipped_when_hidden() {
        let config = ViewerConfig {
            ambient: 2.0,
            ..ViewerConfig::default()
        };
        let mut renderer = render(&config);
        let before: Vec<Framebuffer> = renderer
            .viewports()
            .iter()
            .map(|v| v.framebuffer().clone())
            .collect();

        renderer.set_projections_visible(false);
        renderer.render_all(&Geometry::solid(&config));
        let after: Vec<Framebuffer> = renderer
            .viewports()
            .iter()
            .map(|v| v.framebuffer().clone())
            .collect();
        assert!(renderer.viewports().iter().all(|v| !v.is_enabled()));
        assert_eq!(before, after);
    }

    #[test]
    fn test_hide_then_show_projections_reproduces_frames() {
        let config = ViewerConfig::default();
        let geometry = Geometry::solid(&config)
            .transformed(&Matrix4::new_rotation(Vector3::new(0.3, 0.5, 0.1)));
        let mut renderer = MultiViewRenderer::uniform(&config, 48, 48);
        renderer.render_all(&geometry);
        let before: Vec<Framebuffer> = renderer
            .viewports()
            .iter()
            .map(|v| v.framebuffer().clone())
            .collect();

        assert!(!renderer.toggle_projections());
        renderer.render_all(&geometry);
        for kind in ViewKind::PROJECTIONS {
            let fb = renderer.viewport(kind).unwrap().framebuffer();
            assert_eq!(fb.coverage(config.clear_color), 0);
        }

        renderer.set_projections_visible(true);
        renderer.render_all(&geometry);
        let after: Vec<Framebuffer> = renderer
            .viewports()
            .iter()
            .map(|v| v.framebuffer().clone())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_projection_orientation() {
        let config = ViewerConfig::default();
        let identity = Matrix4::identity();
        let up_z = Point3::new(0.0, 0.0, 1.0);

        let xz = ViewKind::Xz.camera(&config, 100, 100);
        let (_, y, _) = xz.project_to_screen(&up_z, &identity, 100, 100).unwrap();
        assert!(y < 50.0, "+Z should point up in the XZ view");

        let yz = ViewKind::Yz.camera(&config, 100, 100);
        let (x, _, _) = yz.project_to_screen(&up_z, &identity, 100, 100).unwrap();
        assert!(x > 50.0, "+Z should point right in the YZ view");

        let xy = ViewKind::Xy.camera(&config, 100, 100);
        let (x, _, _) = xy
            .project_to_screen(&Point3::new(1.0, 0.0, 0.0), &identity, 100, 100)
            .unwrap();
        assert!(x > 50.0, "+X should point right in the XY view");
    }

    #[test]
    fn test_camera_reset_touches_only_main() {
        let config = ViewerConfig::default();
        let mut renderer = MultiViewRenderer::uniform(&config, 16, 16);
        let xy_before = renderer.viewport(ViewKind::Xy).unwrap().camera().clone();

        renderer.orbit_main(0.5, 0.2);
        renderer.zoom_main(0.5);
        assert_ne!(
            renderer.viewport(ViewKind::Main).unwrap().camera().position,
            Point3::new(0.0, 0.0, 6.0)
        );

        renderer.reset_main_camera();
        assert_eq!(
            renderer.viewport(ViewKind::Main).unwrap().camera().position,
            Point3::new(0.0, 0.0, 6.0)
        );
        assert_eq!(renderer.viewport(ViewKind::Xy).unwrap().camera(), &xy_before);
    }

    #[test]
    fn test_resize_keeps_target_on_failure() {
        let config = ViewerConfig::default();
        let mut renderer = MultiViewRenderer::uniform(&config, 16, 16);
        assert!(renderer.resize(ViewKind::Main, 0, 10).is_err());
        renderer.resize(ViewKind::Main, 40, 20).unwrap();
        let main = renderer.viewport(ViewKind::Main).unwrap();
        assert_eq!(main.framebuffer().width(), 40);
        assert!((main.camera().aspect - 2.0).abs() < 1e-6);
    }
}
