use image::RgbaImage;

use crate::BoxError;

/// Index of the chin-bottom landmark within the 36-point FACE contour.
pub const CHIN_CONTOUR_INDEX: usize = 18;

/// A point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePoint {
    pub x: f32,
    pub y: f32,
}

/// Bounding box and chin landmark of a detected face, in image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceDetectInfo {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_y: f32,
    /// Lowest point of the face contour; the overlay is cropped from here down.
    pub chin_bottom: FacePoint,
}

impl FaceDetectInfo {
    /// Build from a box center and size, as face detectors usually report them.
    pub fn from_bounding_box(
        center: FacePoint,
        width: f32,
        height: f32,
        chin_bottom: FacePoint,
    ) -> Self {
        let (x_offset, y_offset) = (width / 2.0, height / 2.0);
        let left = center.x - x_offset;
        let top = center.y - y_offset;
        let right = center.x + x_offset;
        let bottom = center.y + y_offset;
        Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
            center_x: center.x,
            center_y: center.y,
            chin_bottom,
        }
    }
}

/// Chin-bottom landmark of a FACE contour, if the contour is long enough.
pub fn chin_from_face_contour(contour: &[FacePoint]) -> Option<FacePoint> {
    contour.get(CHIN_CONTOUR_INDEX).copied()
}

/// Pluggable face detection backend.
///
/// Implement this over the host's ML face detector. Faces are expected in
/// detection order; the pipeline uses only the first one.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in an RGBA image.
    fn detect(&self, image: &RgbaImage) -> Result<Vec<FaceDetectInfo>, BoxError>;
}
