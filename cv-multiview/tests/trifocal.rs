mod common;

use common::{init_logger, projective_distance, Scene};
use cv_core::nalgebra::{Point2, Vector2};
use cv_core::{CameraMatrix, FeatureTriple, ImageLine, TrifocalTensor};
use cv_multiview::{epipolar, trifocal};

fn pixel_tensor(scene: &Scene) -> TrifocalTensor {
    trifocal::create_trifocal_general(&scene.camera(0), &scene.camera(1), &scene.camera(2))
}

#[test]
fn observations_satisfy_constraints() {
    init_logger();
    let scene = Scene::random(0, 20);
    let tensor = pixel_tensor(&scene).normalize();
    for FeatureTriple(x1, x2, x3) in scene.observations() {
        let residual = trifocal::constraint_ppp(&tensor, x1, x2, x3).norm();
        let scale = [x1, x2, x3]
            .iter()
            .map(|x| x.to_homogeneous().norm())
            .product::<f64>();
        assert!(residual < 1e-10 * scale, "residual {}", residual);

        let l2 = ImageLine::through(x2, x2 + Vector2::new(1.0, 3.0));
        let l3 = ImageLine::through(x3, x3 + Vector2::new(-2.0, 1.0));
        let scale = l2.norm() * l3.norm() * x1.coords.norm();
        assert!(trifocal::constraint_pll(&tensor, x1, &l2, &l3).abs() < 1e-9 * scale);
    }
}

#[test]
fn round_trip_is_projectively_equivalent() {
    init_logger();
    let scene = Scene::random(1, 20);
    let tensor = pixel_tensor(&scene);
    let (p2, p3) = trifocal::extract_camera_matrices(&tensor).unwrap();
    let p1 = CameraMatrix::canonical();

    // Equivalent camera sets have the same fundamental matrices.
    let pairs = [
        ((scene.camera(0), scene.camera(1)), (p1, p2)),
        ((scene.camera(0), scene.camera(2)), (p1, p3)),
        ((scene.camera(1), scene.camera(2)), (p2, p3)),
    ];
    for ((a, b), (c, d)) in pairs {
        let expected = epipolar::projective_to_fundamental(&a, &b).unwrap();
        let found = epipolar::projective_to_fundamental(&c, &d).unwrap();
        assert!(projective_distance(&expected, &found) < 1e-6);
    }

    // The extracted cameras reproduce the tensor.
    let recreated = trifocal::create_trifocal(&p2, &p3).normalize();
    let tensor = tensor.normalize();
    let same = (0..3).all(|i| (recreated[i] - tensor[i]).norm() < 1e-6);
    let opposite = (0..3).all(|i| (recreated[i] + tensor[i]).norm() < 1e-6);
    assert!(same || opposite);
}

#[test]
fn extracted_epipoles_are_orthogonal_to_fundamentals() {
    init_logger();
    let scene = Scene::random(2, 0);
    let tensor = pixel_tensor(&scene);
    let (e2, e3) = trifocal::extract_epipoles(&tensor).unwrap();
    let (f21, f31) = trifocal::extract_fundamental(&tensor).unwrap();
    let (f21, f31) = (f21.normalize(), f31.normalize());
    assert!((f21.transpose() * e2).norm() < 1e-9);
    assert!((f31.transpose() * e3).norm() < 1e-9);

    let (_, e2_two_view) = epipolar::extract_epipoles(&f21).unwrap();
    assert!(e2.cross(&e2_two_view).norm() < 1e-6);
}

#[test]
fn extracted_fundamentals_fit_observations() {
    init_logger();
    let scene = Scene::random(5, 20);
    let (f21, f31) = trifocal::extract_fundamental(&pixel_tensor(&scene)).unwrap();
    let (f21, f31) = (f21.normalize(), f31.normalize());
    let (first, second, third) = FeatureTriple::split(&scene.observations());
    for ((&x1, &x2), &x3) in first.iter().zip(&second).zip(&third) {
        let scale = x1.to_homogeneous().norm();
        assert!(epipolar::constraint(&f21, x1, x2).abs() < 1e-9 * scale * x2.to_homogeneous().norm());
        assert!(epipolar::constraint(&f31, x1, x3).abs() < 1e-9 * scale * x3.to_homogeneous().norm());
    }
}

#[test]
fn point_and_line_transfer_agree() {
    init_logger();
    let scene = Scene::random(3, 20);
    let tensor = pixel_tensor(&scene);
    for FeatureTriple(x1, x2, x3) in scene.observations() {
        let to3 = Point2::from_homogeneous(trifocal::transfer_1_to_3(&tensor, x1, x2).unwrap())
            .unwrap();
        let to2 = Point2::from_homogeneous(trifocal::transfer_1_to_2(&tensor, x1, x3).unwrap())
            .unwrap();
        assert!((to3 - x3).norm() < 1e-4, "view 3 error {}", (to3 - x3).norm());
        assert!((to2 - x2).norm() < 1e-4, "view 2 error {}", (to2 - x2).norm());

        // Any line through x2 other than its epipolar line transfers to the same point.
        let line = ImageLine::through(x2, x2 + Vector2::new(0.3, 1.0));
        let by_line =
            Point2::from_homogeneous(trifocal::transfer_1_to_3_line(&tensor, x1, &line)).unwrap();
        assert!((by_line - to3).norm() < 1e-4);
    }
}

#[test]
fn induced_homography_maps_points_on_plane() {
    init_logger();
    let scene = Scene::random(4, 20);
    let tensor = pixel_tensor(&scene);
    let observations = scene.observations();
    let FeatureTriple(_, a2, _) = observations[0];
    let FeatureTriple(_, b2, _) = observations[1];
    // The plane through the second camera center and the line through two observations.
    let line = ImageLine::through(a2, b2);
    let h13 = trifocal::induced_homography_13(&tensor, &line);
    for FeatureTriple(x1, _, x3) in observations.into_iter().take(2) {
        let mapped = Point2::from_homogeneous(h13 * x1.to_homogeneous()).unwrap();
        assert!((mapped - x3).norm() < 1e-4);
    }
}
