use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cv_core::nalgebra::{Matrix3x4, Point2, Rotation3, Vector3};
use cv_core::CameraMatrix;
use cv_multiview::{homography, metric, trifocal};

#[rustfmt::skip]
fn cameras() -> [CameraMatrix; 3] {
    [
        CameraMatrix(Matrix3x4::new(
            500.0, 0.0,   320.0, 0.0,
            0.0,   500.0, 240.0, 0.0,
            0.0,   0.0,   1.0,   0.0,
        )),
        CameraMatrix(Matrix3x4::new(
            480.0, -40.0, 350.0, 300.0,
            50.0,  495.0, 230.0, -90.0,
            -0.15, 0.03,  0.98,  0.1,
        )),
        CameraMatrix(Matrix3x4::new(
            520.0, 90.0,  280.0, -250.0,
            -100.0, 490.0, 260.0, 200.0,
            0.2,   -0.1,  0.96,  0.3,
        )),
    ]
}

fn bench_trifocal(c: &mut Criterion) {
    let [p1, p2, p3] = cameras();
    c.bench_function("create_trifocal_general", |b| {
        b.iter(|| trifocal::create_trifocal_general(black_box(&p1), black_box(&p2), black_box(&p3)))
    });
    let tensor = trifocal::create_trifocal_general(&p1, &p2, &p3);
    c.bench_function("extract_camera_matrices", |b| {
        b.iter(|| trifocal::extract_camera_matrices(black_box(&tensor)))
    });
    let (x1, x2) = (Point2::new(310.0, 250.0), Point2::new(330.0, 244.0));
    c.bench_function("transfer_1_to_3", |b| {
        b.iter(|| trifocal::transfer_1_to_3(black_box(&tensor), black_box(x1), black_box(x2)))
    });
}

fn bench_decompose(c: &mut Criterion) {
    let [_, p2, _] = cameras();
    c.bench_function("decompose_metric_camera", |b| {
        b.iter(|| metric::decompose_metric_camera(black_box(&p2)))
    });
    let h = homography::create_homography(
        Rotation3::from_euler_angles(0.1, -0.2, 0.05).matrix(),
        &Vector3::new(0.3, 0.1, -0.2),
        4.0,
        &Vector3::new(0.1, 0.1, 1.0).normalize(),
    )
    .unwrap();
    c.bench_function("decompose_homography", |b| {
        b.iter(|| homography::decompose_homography(black_box(&h)))
    });
}

criterion_group!(
    name = multiview;
    config = Criterion::default();
    targets = bench_trifocal, bench_decompose
);

criterion_main!(multiview);
