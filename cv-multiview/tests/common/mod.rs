#![allow(dead_code)]

use cv_core::nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3};
use cv_core::{CameraMatrix, FeatureTriple, Pose, Projective, WorldPoint, WorldToCamera};
use rand::{rngs::SmallRng, Rng, SeedableRng};

pub fn init_logger() {
    let _ = pretty_env_logger::try_init_timed();
}

/// Three calibrated cameras looking at a cloud of points in front of all of them.
///
/// The first camera is at the world origin.
pub struct Scene {
    pub k: Matrix3<f64>,
    pub poses: [WorldToCamera; 3],
    pub points: Vec<Point3<f64>>,
}

impl Scene {
    pub fn random(seed: u64, num_points: usize) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        #[rustfmt::skip]
        let k = Matrix3::new(
            rng.gen_range(400.0..700.0), rng.gen_range(-1.0..1.0),   rng.gen_range(300.0..340.0),
            0.0,                         rng.gen_range(400.0..700.0), rng.gen_range(220.0..260.0),
            0.0,                         0.0,                         1.0,
        );
        let mut pose = || {
            WorldToCamera::from_parts(
                Vector3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-0.5..0.5),
                    rng.gen_range(-0.3..0.3),
                ),
                Rotation3::new(Vector3::from_fn(|_, _| rng.gen_range(-0.15..0.15))),
            )
        };
        let poses = [WorldToCamera::identity(), pose(), pose()];
        let points = (0..num_points)
            .map(|_| {
                Point3::new(
                    rng.gen_range(-2.0..2.0),
                    rng.gen_range(-2.0..2.0),
                    rng.gen_range(6.0..10.0),
                )
            })
            .collect();
        Self { k, poses, points }
    }

    pub fn camera(&self, view: usize) -> CameraMatrix {
        CameraMatrix::from_parts(&self.k, self.poses[view])
    }

    /// The camera with the identity calibration, which observes normalized coordinates.
    pub fn normalized_camera(&self, view: usize) -> CameraMatrix {
        self.poses[view].camera_matrix()
    }

    pub fn project(camera: &CameraMatrix, point: Point3<f64>) -> Point2<f64> {
        Point2::from_homogeneous(camera.project(WorldPoint::from_point(point)))
            .expect("point projected to infinity")
    }

    pub fn observations(&self) -> Vec<FeatureTriple<Point2<f64>>> {
        let cameras = [self.camera(0), self.camera(1), self.camera(2)];
        self.points
            .iter()
            .map(|&point| {
                FeatureTriple(
                    Self::project(&cameras[0], point),
                    Self::project(&cameras[1], point),
                    Self::project(&cameras[2], point),
                )
            })
            .collect()
    }
}

/// Distance between two matrices after normalizing both to unit Frobenius norm,
/// minimized over their relative sign.
pub fn projective_distance(a: &Matrix3<f64>, b: &Matrix3<f64>) -> f64 {
    let (a, b) = (a.normalize(), b.normalize());
    (a - b).norm().min((a + b).norm())
}
