use approx::assert_relative_eq;
use kview_core::{
    Control, Controller, Geometry, Mesh, MultiViewRenderer, Shape, Transform,
    TransformParameters, ViewKind, ViewerConfig,
};
use nalgebra::{Point3, Vector3};
use proptest::prelude::*;

fn letter_points() -> Vec<Point3<f32>> {
    let config = ViewerConfig::default();
    match Geometry::solid(&config).shape {
        Shape::Solid(mesh) => mesh
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| v.position))
            .collect(),
        Shape::Wireframe(_) => unreachable!(),
    }
}

fn params_strategy() -> impl Strategy<Value = TransformParameters> {
    (
        prop::array::uniform3(-3.0f32..3.0),
        prop::array::uniform3(-180.0f32..180.0),
        prop_oneof![0.1f32..3.0, -3.0f32..-0.1],
    )
        .prop_map(|(t, r, s)| TransformParameters::new(Vector3::from(t), Vector3::from(r), s))
}

#[test]
fn test_identity_leaves_vertices_unchanged() {
    let points = letter_points();
    let matrix = Transform::compose(&TransformParameters::identity());
    assert_eq!(Transform::apply_points(&matrix, &points), points);
}

#[test]
fn test_spec_example_rotate_scale_translate() {
    let params = TransformParameters::new(
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 90.0),
        2.0,
    );
    let matrix = Transform::compose(&params);
    let moved = Transform::apply_points(&matrix, &[Point3::new(1.0, 0.0, 0.0)]);
    assert_relative_eq!(moved[0], Point3::new(1.0, 2.0, 0.0), epsilon = 1e-6);
}

#[test]
fn test_winding_agrees_with_face_normals() {
    let mesh = Mesh::letter_k(&ViewerConfig::default().letter);
    for triangle in &mesh.triangles {
        assert!(triangle.calculate_normal().dot(&triangle.face_normal()) > 0.0);
    }
}

#[test]
fn test_wireframe_variant_renders() {
    let config = ViewerConfig::default();
    let mut controller = Controller::new(
        Geometry::wireframe(&config),
        MultiViewRenderer::uniform(&config, 48, 48),
    );
    controller.set(Control::RotateY, 30.0);
    controller.flush();

    for kind in ViewKind::ALL {
        let viewport = controller.renderer().viewport(kind).unwrap();
        assert!(viewport.framebuffer().coverage(config.clear_color) > 20);
    }
}

#[test]
fn test_reset_after_edits() {
    let config = ViewerConfig::default();
    let mut controller = Controller::new(
        Geometry::solid(&config),
        MultiViewRenderer::uniform(&config, 24, 24),
    );
    let initial: Vec<_> = controller
        .renderer()
        .viewports()
        .iter()
        .map(|v| v.framebuffer().clone())
        .collect();

    for control in Control::ALL {
        controller.nudge(control, 3);
    }
    controller.flush();
    controller.reset();
    controller.flush();

    let after: Vec<_> = controller
        .renderer()
        .viewports()
        .iter()
        .map(|v| v.framebuffer().clone())
        .collect();
    assert_eq!(initial, after);
}

proptest! {
    #[test]
    fn prop_inverse_round_trip(params in params_strategy()) {
        let points = letter_points();
        let matrix = Transform::compose(&params);
        let inverse = matrix.try_inverse().expect("non-zero scale is invertible");

        let moved = Transform::apply_points(&matrix, &points);
        let back = Transform::apply_points(&inverse, &moved);
        for (point, restored) in points.iter().zip(&back) {
            prop_assert!((point - restored).norm() < 1e-4);
        }
    }

    #[test]
    fn prop_compose_matches_sequential_application(params in params_strategy()) {
        let p = Point3::new(0.3, -0.7, 0.2);
        let r = params.rotation;
        let s = params.scale;
        let t = params.translation;

        let step = |m: nalgebra::Matrix4<f32>, p: Point3<f32>| Transform::apply_point(&m, &p);
        let scaled = step(Transform::scale_matrix(s, s, s), p);
        let rz = step(Transform::rotation_matrix(&Vector3::new(0.0, 0.0, r.z)), scaled);
        let ry = step(Transform::rotation_matrix(&Vector3::new(0.0, r.y, 0.0)), rz);
        let rx = step(Transform::rotation_matrix(&Vector3::new(r.x, 0.0, 0.0)), ry);
        let expected = step(Transform::translation_matrix(t.x, t.y, t.z), rx);

        let actual = Transform::apply_point(&Transform::compose(&params), &p);
        prop_assert!((actual - expected).norm() < 1e-4);
    }

    #[test]
    fn prop_rotation_text_is_clamped(value in -1.0e6f32..1.0e6) {
        for control in [Control::RotateX, Control::RotateY, Control::RotateZ] {
            let parsed = control.parse(&value.to_string()).unwrap();
            prop_assert!((-180.0..=180.0).contains(&parsed));
            if (-180.0..=180.0).contains(&value) {
                prop_assert_eq!(parsed, value);
            }
        }
    }
}
