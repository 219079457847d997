use image::RgbaImage;

use crate::error::OverlayError;
use crate::face_detector::FaceDetectInfo;

/// Crop region within the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Full-width strip from the chin line down to the bottom of the image.
///
/// The chin y-coordinate is truncated toward zero, so a line just above the
/// image (between -1 and 0) starts at row 0. A line that is still negative
/// after truncation, not finite, or at or past the last row is rejected.
pub fn below_chin_region(
    image_width: u32,
    image_height: u32,
    chin_y: f32,
) -> Result<CropRegion, OverlayError> {
    let invalid = || OverlayError::InvalidCropRegion {
        chin_y,
        height: image_height,
    };
    let truncated = chin_y.trunc();
    if !truncated.is_finite() || truncated < 0.0 {
        return Err(invalid());
    }

    let y = truncated as u32;
    if y >= image_height {
        return Err(invalid());
    }

    Ok(CropRegion {
        x: 0,
        y,
        width: image_width,
        height: image_height - y,
    })
}

/// Crop the processed clothes image so it starts at the face's chin line.
pub fn crop_below_chin(
    image: &RgbaImage,
    face: &FaceDetectInfo,
) -> Result<RgbaImage, OverlayError> {
    let CropRegion {
        x,
        y,
        width,
        height,
    } = below_chin_region(image.width(), image.height(), face.chin_bottom.y)?;
    Ok(image::imageops::crop_imm(image, x, y, width, height).to_image())
}
