use crate::{ImagePoint, KeyPoint};

/// Allows conversion between the point on an image and the internal projection
/// of a camera model, such as a normalized image coordinate.
///
/// Multi-view relations built from pixel coordinates (fundamental matrices, pixel
/// homographies) and those built from calibrated coordinates (essential matrices,
/// Euclidean homographies) are connected through this conversion.
pub trait CameraModel {
    type Projection;

    /// Extracts a projection from a pixel location in an image.
    ///
    /// The image X axis points right and the Y axis points down.
    fn calibrate<P>(&self, point: P) -> Self::Projection
    where
        P: ImagePoint;

    /// Extracts the pixel location in the image from the projection.
    fn uncalibrate(&self, projection: Self::Projection) -> KeyPoint;
}
