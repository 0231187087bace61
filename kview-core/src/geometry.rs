/// Fixed geometry for the letter K: a lit solid, a wireframe outline and an axes gizmo
use nalgebra::{Matrix3, Matrix4, Point3, Vector3};

use crate::config::{LetterDimensions, ViewerConfig};
use crate::transform::Transform;

/// RGBA color with components in `[0, 1]`
pub type Rgba = [f32; 4];

const STEM_COLOR: Rgba = [0.9, 0.92, 0.95, 1.0];
const ARM_COLOR: Rgba = [0.8, 0.85, 0.95, 1.0];
const OUTLINE_COLOR: Rgba = [0.9, 0.92, 0.95, 1.0];

pub const X_AXIS_COLOR: Rgba = [0.8, 0.2, 0.2, 1.0];
pub const Y_AXIS_COLOR: Rgba = [0.2, 0.8, 0.2, 1.0];
pub const Z_AXIS_COLOR: Rgba = [0.2, 0.2, 0.8, 1.0];

/// X position of the stem centre line
const STEM_X: f32 = -0.9;
/// Where the upper arm ends; the lower arm is mirrored across the X axis
const ARM_TIP: (f32, f32) = (0.6, 0.7);

/// Corners of a box with half extents of one, indexed by `BOX_FACES`
const BOX_CORNERS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// Quads of a box with their outward normals. The corner order is not
/// consistently wound; `Mesh::cuboid` fixes that per triangle.
const BOX_FACES: [([usize; 4], [f32; 3]); 6] = [
    ([0, 1, 2, 3], [0.0, 0.0, -1.0]),
    ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
    ([0, 4, 7, 3], [-1.0, 0.0, 0.0]),
    ([1, 5, 6, 2], [1.0, 0.0, 0.0]),
    ([3, 2, 6, 7], [0.0, 1.0, 0.0]),
    ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
];

/// A 3D vertex with position, normal and color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub color: Rgba,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, color: Rgba) -> Self {
        Self {
            position,
            normal,
            color,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's winding
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }

    /// The flat normal assigned when the triangle was built
    pub fn face_normal(&self) -> Vector3<f32> {
        self.vertices[0].normal
    }
}

/// A flat-shaded triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Move every triangle of `other` into this mesh
    pub fn append(&mut self, other: Mesh) {
        self.triangles.extend(other.triangles);
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    /// Build a `size` box centred on the origin and placed by `model`.
    ///
    /// Each face gets its normal transformed by the inverse-transpose of
    /// `model`, and each triangle is rewound so that its edge cross product
    /// points the same way as that normal.
    pub fn cuboid(size: Vector3<f32>, model: &Matrix4<f32>, color: Rgba) -> Self {
        let half = size / 2.0;
        let corners: Vec<Point3<f32>> = BOX_CORNERS
            .iter()
            .map(|c| {
                let local = Point3::new(c[0] * half.x, c[1] * half.y, c[2] * half.z);
                Transform::apply_point(model, &local)
            })
            .collect();
        let normal_matrix = Transform::normal_matrix(model).unwrap_or_else(Matrix3::identity);

        let mut mesh = Self::with_capacity(BOX_FACES.len() * 2);
        for (quad, normal) in BOX_FACES {
            let face_normal = (normal_matrix * Vector3::from(normal)).normalize();
            for tri in [[quad[0], quad[1], quad[2]], [quad[0], quad[2], quad[3]]] {
                let [a, b, c] = wind_outward(tri, &corners, &face_normal)
                    .map(|i| Vertex::new(corners[i], face_normal, color));
                mesh.add_triangle(Triangle::new(a, b, c));
            }
        }
        mesh
    }

    /// The solid letter K: a vertical stem and two diagonal arms
    pub fn letter_k(dims: &LetterDimensions) -> Self {
        let stem = Matrix4::new_translation(&Vector3::new(STEM_X, 0.0, 0.0));
        let mut mesh = Self::cuboid(
            Vector3::new(dims.bar_width, dims.vertical_height, dims.thickness),
            &stem,
            STEM_COLOR,
        );

        let arm_size = Vector3::new(dims.arm_length, dims.arm_thickness, dims.thickness);
        for sign in [1.0, -1.0] {
            let (center, angle) = arm_placement(sign);
            let model = Matrix4::new_translation(&center)
                * Matrix4::from_axis_angle(&Vector3::z_axis(), angle);
            mesh.append(Self::cuboid(arm_size, &model, ARM_COLOR));
        }
        mesh
    }

    /// Apply `matrix` to every vertex, returning a new mesh
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let normal_matrix = Transform::normal_matrix(matrix);
        let triangles = self
            .triangles
            .iter()
            .map(|tri| Triangle {
                vertices: tri.vertices.map(|v| Vertex {
                    position: Transform::apply_point(matrix, &v.position),
                    normal: normal_matrix
                        .and_then(|m| (m * v.normal).try_normalize(f32::EPSILON))
                        .unwrap_or(v.normal),
                    color: v.color,
                }),
            })
            .collect();
        Self { triangles }
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Swap the last two corners of `tri` if its winding opposes `normal`
fn wind_outward(mut tri: [usize; 3], corners: &[Point3<f32>], normal: &Vector3<f32>) -> [usize; 3] {
    let edge1 = corners[tri[1]] - corners[tri[0]];
    let edge2 = corners[tri[2]] - corners[tri[0]];
    if edge1.cross(&edge2).dot(normal) < 0.0 {
        tri.swap(1, 2);
    }
    tri
}

/// Centre and Z rotation of the arm running from the stem to the mirrored tip
fn arm_placement(sign: f32) -> (Vector3<f32>, f32) {
    let (tip_x, tip_y) = (ARM_TIP.0, sign * ARM_TIP.1);
    let center = Vector3::new((STEM_X + tip_x) / 2.0, tip_y / 2.0, 0.0);
    (center, tip_y.atan2(tip_x - STEM_X))
}

/// A line segment between two wireframe points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub color: Rgba,
}

impl Edge {
    pub fn new(a: usize, b: usize, color: Rgba) -> Self {
        Self { a, b, color }
    }
}

/// Points joined by colored edges
#[derive(Debug, Clone, PartialEq)]
pub struct Wireframe {
    pub points: Vec<Point3<f32>>,
    pub edges: Vec<Edge>,
}

impl Wireframe {
    pub fn new(points: Vec<Point3<f32>>, edges: Vec<Edge>) -> Self {
        Self { points, edges }
    }

    /// The K outline, extruded to the letter's thickness
    pub fn letter_k(dims: &LetterDimensions) -> Self {
        let outline = k_outline(dims);
        let n = outline.len();
        let half = dims.thickness / 2.0;

        let points = [half, -half]
            .into_iter()
            .flat_map(|z| outline.iter().map(move |&(x, y)| Point3::new(x, y, z)))
            .collect();

        let mut edges = Vec::with_capacity(n * 3);
        for i in 0..n {
            let next = (i + 1) % n;
            edges.push(Edge::new(i, next, OUTLINE_COLOR));
            edges.push(Edge::new(n + i, n + next, OUTLINE_COLOR));
            edges.push(Edge::new(i, n + i, OUTLINE_COLOR));
        }
        Self::new(points, edges)
    }

    /// Coordinate axes running from `-length` to `length`
    pub fn axes(length: f32) -> Self {
        let points = vec![
            Point3::new(-length, 0.0, 0.0),
            Point3::new(length, 0.0, 0.0),
            Point3::new(0.0, -length, 0.0),
            Point3::new(0.0, length, 0.0),
            Point3::new(0.0, 0.0, -length),
            Point3::new(0.0, 0.0, length),
        ];
        let edges = vec![
            Edge::new(0, 1, X_AXIS_COLOR),
            Edge::new(2, 3, Y_AXIS_COLOR),
            Edge::new(4, 5, Z_AXIS_COLOR),
        ];
        Self::new(points, edges)
    }

    /// Endpoints and color of every edge
    pub fn segments(&self) -> impl Iterator<Item = (Point3<f32>, Point3<f32>, Rgba)> + '_ {
        self.edges
            .iter()
            .map(|e| (self.points[e.a], self.points[e.b], e.color))
    }

    /// Apply `matrix` to every point, returning a new wireframe
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        Self {
            points: Transform::apply_points(matrix, &self.points),
            edges: self.edges.clone(),
        }
    }
}

/// Counter-clockwise outline of the K in the XY plane
fn k_outline(dims: &LetterDimensions) -> Vec<(f32, f32)> {
    let left = STEM_X - dims.bar_width / 2.0;
    let right = STEM_X + dims.bar_width / 2.0;
    let top = dims.vertical_height / 2.0;
    let joint = dims.arm_thickness;
    let (tip, foot) = (ARM_TIP.0, ARM_TIP.0 + dims.arm_thickness);

    vec![
        (left, -top),
        (right, -top),
        (right, -joint),
        (tip, -top),
        (foot, -top),
        (right + joint, 0.0),
        (foot, top),
        (tip, top),
        (right, joint),
        (right, top),
        (left, top),
    ]
}

/// What gets drawn for the letter itself
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Solid(Mesh),
    Wireframe(Wireframe),
}

/// The complete scene: the letter plus an axes gizmo that moves with it
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub shape: Shape,
    pub axes: Wireframe,
}

impl Geometry {
    /// Lit solid variant
    pub fn solid(config: &ViewerConfig) -> Self {
        Self {
            shape: Shape::Solid(Mesh::letter_k(&config.letter)),
            axes: Wireframe::axes(config.axis_length),
        }
    }

    /// Line-only variant
    pub fn wireframe(config: &ViewerConfig) -> Self {
        Self {
            shape: Shape::Wireframe(Wireframe::letter_k(&config.letter)),
            axes: Wireframe::axes(config.axis_length),
        }
    }

    /// Number of positions the applicator touches per update
    pub fn vertex_count(&self) -> usize {
        let shape = match &self.shape {
            Shape::Solid(mesh) => mesh.vertex_count(),
            Shape::Wireframe(wire) => wire.points.len(),
        };
        shape + self.axes.points.len()
    }

    /// Apply `matrix` to every vertex of the scene
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Self {
        let shape = match &self.shape {
            Shape::Solid(mesh) => Shape::Solid(mesh.transformed(matrix)),
            Shape::Wireframe(wire) => Shape::Wireframe(wire.transformed(matrix)),
        };
        Self {
            shape,
            axes: self.axes.transformed(matrix),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_cuboid_triangle_count() {
        let mesh = Mesh::cuboid(Vector3::new(1.0, 2.0, 3.0), &Matrix4::identity(), STEM_COLOR);
        assert_eq!(mesh.triangles.len(), 12);
        assert_eq!(mesh.vertex_count(), 36);
    }

    #[test]
    fn test_letter_k_winding_matches_face_normals() {
        let mesh = Mesh::letter_k(&LetterDimensions::default());
        assert_eq!(mesh.triangles.len(), 36);
        for triangle in &mesh.triangles {
            let dot = triangle.calculate_normal().dot(&triangle.face_normal());
            assert!(dot > 0.0, "triangle winding opposes its normal: {:?}", triangle);
        }
    }

    #[test]
    fn test_face_normals_are_unit_length() {
        let mesh = Mesh::letter_k(&LetterDimensions::default());
        for triangle in &mesh.triangles {
            for vertex in &triangle.vertices {
                assert_relative_eq!(vertex.normal.norm(), 1.0, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_rotated_box_normals_follow_rotation() {
        let model = Matrix4::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2);
        let mesh = Mesh::cuboid(Vector3::new(1.0, 1.0, 1.0), &model, ARM_COLOR);
        // The +X face ends up facing +Y
        let rotated = mesh.triangles[6].face_normal();
        assert_relative_eq!(rotated, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_stem_spans_vertical_height() {
        let dims = LetterDimensions::default();
        let mesh = Mesh::letter_k(&dims);
        let max_y = mesh
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .map(|v| v.position.y)
            .fold(f32::MIN, f32::max);
        assert_relative_eq!(max_y, dims.vertical_height / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_wireframe_letter_k_counts() {
        let wire = Wireframe::letter_k(&LetterDimensions::default());
        assert_eq!(wire.points.len(), 22);
        assert_eq!(wire.edges.len(), 33);
        assert!(wire
            .edges
            .iter()
            .all(|e| e.a < wire.points.len() && e.b < wire.points.len()));
    }

    #[test]
    fn test_axes_colors() {
        let axes = Wireframe::axes(2.0);
        let colors: Vec<Rgba> = axes.segments().map(|(_, _, c)| c).collect();
        assert_eq!(colors, vec![X_AXIS_COLOR, Y_AXIS_COLOR, Z_AXIS_COLOR]);
    }

    #[test]
    fn test_transformed_leaves_base_untouched() {
        let config = ViewerConfig::default();
        let base = Geometry::solid(&config);
        let snapshot = base.clone();
        let moved = base.transformed(&Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(base, snapshot);
        assert_ne!(moved, base);
        assert_eq!(moved.vertex_count(), base.vertex_count());
    }

    #[test]
    fn test_zero_scale_keeps_normals() {
        let mesh = Mesh::letter_k(&LetterDimensions::default());
        let flat = mesh.transformed(&Matrix4::new_nonuniform_scaling(&Vector3::repeat(0.0)));
        for (before, after) in mesh.triangles.iter().zip(&flat.triangles) {
            assert_eq!(before.face_normal(), after.face_normal());
            assert_eq!(after.vertices[0].position, Point3::origin());
        }
    }
}
