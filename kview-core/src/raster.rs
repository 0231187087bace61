/// CPU rasterizer: RGBA framebuffer with depth, filled triangles and lines
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

use crate::error::{Result, ViewError};
use crate::geometry::{Mesh, Rgba, Wireframe};

/// Depth bias for filled triangles so coincident lines stay visible
const POLYGON_OFFSET: f32 = 1e-4;
/// Clip-space `w` at or below which a vertex counts as behind the camera
const MIN_W: f32 = 1e-6;
/// Lines longer than this many pixel steps are dropped
const MAX_LINE_STEPS: usize = 1 << 16;

/// Values shared by every primitive of one draw call
#[derive(Debug, Clone, PartialEq)]
pub struct Uniforms {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    /// Unit light direction, in view space
    pub light_dir: Vector3<f32>,
    /// Flat color replacing the vertex colors
    pub tint: Option<Rgba>,
}

/// Per-fragment Lambert shading over an ambient floor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LambertProgram {
    light_dir: Vector3<f32>,
    ambient: f32,
}

impl LambertProgram {
    pub const NAME: &'static str = "lambert";

    /// Validate the program's inputs. A program that fails here leaves its
    /// viewport disabled.
    pub fn compile(light_dir: &Vector3<f32>, ambient: f32) -> Result<Self> {
        if !ambient.is_finite() || !(0.0..=1.0).contains(&ambient) {
            return Err(ViewError::ShaderCompile {
                program: Self::NAME,
                log: format!("uAmbient = {ambient} is outside [0, 1]"),
            });
        }
        let light_dir = light_dir
            .iter()
            .all(|c| c.is_finite())
            .then(|| light_dir.try_normalize(f32::EPSILON))
            .flatten()
            .ok_or_else(|| ViewError::ShaderCompile {
                program: Self::NAME,
                log: format!(
                    "uLightDir = ({}, {}, {}) cannot be normalized",
                    light_dir.x, light_dir.y, light_dir.z
                ),
            })?;
        Ok(Self { light_dir, ambient })
    }

    /// Unit light direction the program was compiled with
    pub fn light_dir(&self) -> &Vector3<f32> {
        &self.light_dir
    }


    /// `rgb * (ambient + max(n . l, 0) * (1 - ambient))`, alpha untouched
    pub fn shade(&self, normal: &Vector3<f32>, light: &Vector3<f32>, color: Rgba) -> Rgba {
        let diffuse = normal
            .try_normalize(f32::EPSILON)
            .map_or(0.0, |n| n.dot(light).max(0.0));
        let k = self.ambient + diffuse * (1.0 - self.ambient);
        [color[0] * k, color[1] * k, color[2] * k, color[3]]
    }
}

/// A vertex after projection: pixel position, NDC depth and the attributes
/// interpolated across the triangle
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    z: f32,
    inv_w: f32,
    normal: Vector3<f32>,
    color: Rgba,
}

/// RGBA8 color target with an f32 depth buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    color: Vec<u8>,
    depth: Vec<f32>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            color: vec![0; size * 4],
            depth: vec![f32::INFINITY; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major RGBA8 bytes, ready for blitting
    pub fn pixels(&self) -> &[u8] {
        &self.color
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.color[i],
            self.color[i + 1],
            self.color[i + 2],
            self.color[i + 3],
        ]
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    /// Clear color and depth
    pub fn clear(&mut self, color: Rgba) {
        let rgba = to_rgba8(color);
        for pixel in self.color.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
        self.depth.fill(f32::INFINITY);
    }

    /// Number of pixels whose color differs from `background`
    pub fn coverage(&self, background: Rgba) -> usize {
        let rgba = to_rgba8(background);
        self.color
            .chunks_exact(4)
            .filter(|pixel| *pixel != rgba.as_slice())
            .count()
    }

    /// Draw a lit mesh with depth testing and back-face culling
    pub fn draw_mesh(&mut self, mesh: &Mesh, program: &LambertProgram, uniforms: &Uniforms) {
        let mvp = uniforms.projection * uniforms.view;
        let view_rotation: Matrix3<f32> = uniforms.view.fixed_view::<3, 3>(0, 0).into_owned();

        for triangle in &mesh.triangles {
            let mut projected = Vec::with_capacity(3);
            for vertex in &triangle.vertices {
                let clip = mvp * vertex.position.to_homogeneous();
                let Some((x, y, z, inv_w)) = self.to_screen(&clip) else {
                    break;
                };
                projected.push(ScreenVertex {
                    x,
                    y,
                    z: z + POLYGON_OFFSET,
                    inv_w,
                    normal: view_rotation * vertex.normal,
                    color: uniforms.tint.unwrap_or(vertex.color),
                });
            }
            // Triangle crosses the near plane
            if projected.len() != 3 {
                continue;
            }

            let (a, b, c) = (&projected[0], &projected[1], &projected[2]);
            if !is_front_facing(a, b, c) {
                continue;
            }
            self.rasterize_triangle([a, b, c], program, &uniforms.light_dir);
        }
    }

    /// Draw every edge as an unlit, depth-tested line
    pub fn draw_wireframe(
        &mut self,
        wireframe: &Wireframe,
        mvp: &Matrix4<f32>,
        tint: Option<Rgba>,
    ) {
        for (a, b, color) in wireframe.segments() {
            let Some((a, b)) = clip_near(mvp * a.to_homogeneous(), mvp * b.to_homogeneous()) else {
                continue;
            };
            if let (Some(a), Some(b)) = (self.to_screen(&a), self.to_screen(&b)) {
                self.draw_line(a, b, tint.unwrap_or(color));
            }
        }
    }

    /// Perspective divide and viewport transform. `None` for vertices behind
    /// the near plane.
    fn to_screen(&self, clip: &Vector4<f32>) -> Option<(f32, f32, f32, f32)> {
        if !in_front(clip) {
            return None;
        }
        let inv_w = 1.0 / clip.w;
        let ndc = clip.xyz() * inv_w;
        let x = (ndc.x + 1.0) * 0.5 * self.width as f32;
        let y = (1.0 - ndc.y) * 0.5 * self.height as f32;
        Some((x, y, ndc.z, inv_w))
    }

    fn rasterize_triangle(
        &mut self,
        [a, b, c]: [&ScreenVertex; 3],
        program: &LambertProgram,
        light: &Vector3<f32>,
    ) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        // Bounding box, clipped to the target
        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
        let max_x = a.x.max(b.x).max(c.x).ceil().min(self.width as f32 - 1.0);
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
        let max_y = a.y.max(b.y).max(c.y).ceil().min(self.height as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as usize, max_y as usize);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((w0, w1, w2)) = barycentric((a.x, a.y), (b.x, b.y), (c.x, c.y), p) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * a.z + w1 * b.z + w2 * c.z;
                let idx = y * self.width + x;
                if !(-1.0..=1.0).contains(&depth) || depth >= self.depth[idx] {
                    continue;
                }

                // Perspective-correct attribute weights
                let (p0, p1, p2) = (w0 * a.inv_w, w1 * b.inv_w, w2 * c.inv_w);
                let sum = p0 + p1 + p2;
                let normal = (a.normal * p0 + b.normal * p1 + c.normal * p2) / sum;
                let mut color = [0.0; 4];
                for (i, channel) in color.iter_mut().enumerate() {
                    *channel = (a.color[i] * p0 + b.color[i] * p1 + c.color[i] * p2) / sum;
                }

                let shaded = program.shade(&normal, light, color);
                self.write(idx, depth, shaded);
            }
        }
    }

    fn draw_line(&mut self, a: (f32, f32, f32, f32), b: (f32, f32, f32, f32), color: Rgba) {
        let (dx, dy, dz) = (b.0 - a.0, b.1 - a.1, b.2 - a.2);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        if !steps.is_finite() || steps as usize > MAX_LINE_STEPS {
            log::trace!("dropping line with {steps} steps");
            return;
        }
        let steps = steps as usize;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let (x, y, z) = (a.0 + dx * t, a.1 + dy * t, a.2 + dz * t);
            if x < 0.0 || y < 0.0 || !(-1.0..=1.0).contains(&z) {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x >= self.width || y >= self.height {
                continue;
            }
            let idx = y * self.width + x;
            if z <= self.depth[idx] {
                self.write(idx, z, color);
            }
        }
    }

    fn write(&mut self, idx: usize, depth: f32, color: Rgba) {
        self.depth[idx] = depth;
        self.color[idx * 4..idx * 4 + 4].copy_from_slice(&to_rgba8(color));
    }
}

/// Quantize a float color to RGBA8
pub fn to_rgba8(color: Rgba) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// In front of the near plane (`z >= -w`) with a usable `w`
fn in_front(clip: &Vector4<f32>) -> bool {
    clip.w > MIN_W && clip.z + clip.w >= 0.0
}

/// Cut a clip-space segment at the near plane
fn clip_near(a: Vector4<f32>, b: Vector4<f32>) -> Option<(Vector4<f32>, Vector4<f32>)> {
    let da = a.z + a.w;
    let db = b.z + b.w;
    match (da >= 0.0, db >= 0.0) {
        (true, true) => Some((a, b)),
        (false, false) => None,
        (true, false) => Some((a, a + (b - a) * (da / (da - db)))),
        (false, true) => Some((b + (a - b) * (db / (db - da)), b)),
    }
}

/// Counter-clockwise in NDC. Screen y points down, so that is a negative
/// signed area here.
fn is_front_facing(a: &ScreenVertex, b: &ScreenVertex, c: &ScreenVertex) -> bool {
    let area = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
    area < 0.0
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
