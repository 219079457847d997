uniffi::setup_scaffolding!();

use image::RgbaImage;

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum OverlayError {
    #[error("score buffer size mismatch: expected {expected}, got {actual}")]
    BufferSizeMismatch { expected: u64, actual: u64 },
    #[error("image dimensions do not match")]
    DimensionMismatch,
    #[error("invalid dimension: {message}")]
    InvalidDimension { message: String },
    #[error("chin line is outside the image")]
    InvalidCropRegion,
    #[error("no face found")]
    FaceNotFound,
    #[error("segmentation inference failed: {message}")]
    InferenceFailure { message: String },
    #[error("face detection failed: {message}")]
    DetectionFailure { message: String },
    #[error("failed to decode image: {message}")]
    DecodeError { message: String },
    #[error("palette too small for the model's classes")]
    PaletteTooSmall,
}

impl From<clothoverlay::OverlayError> for OverlayError {
    fn from(e: clothoverlay::OverlayError) -> Self {
        use clothoverlay::OverlayError as Core;
        match e {
            Core::BufferSizeMismatch { expected, actual } => OverlayError::BufferSizeMismatch {
                expected: expected as u64,
                actual: actual as u64,
            },
            Core::DimensionMismatch { .. } => OverlayError::DimensionMismatch,
            Core::InvalidDimension(message) => OverlayError::InvalidDimension { message },
            Core::InvalidCropRegion { .. } => OverlayError::InvalidCropRegion,
            Core::FaceNotFound => OverlayError::FaceNotFound,
            Core::InferenceFailure(message) => OverlayError::InferenceFailure { message },
            Core::DetectionFailure(message) => OverlayError::DetectionFailure { message },
            Core::DecodeError(message) => OverlayError::DecodeError { message },
            Core::PaletteTooSmall { .. } => OverlayError::PaletteTooSmall,
        }
    }
}

#[derive(uniffi::Enum)]
pub enum BottomEdge {
    Symmetric,
    Legacy,
}

impl From<BottomEdge> for clothoverlay::BottomEdge {
    fn from(mode: BottomEdge) -> Self {
        match mode {
            BottomEdge::Symmetric => clothoverlay::BottomEdge::Symmetric,
            BottomEdge::Legacy => clothoverlay::BottomEdge::Legacy,
        }
    }
}

/// Straight-alpha RGBA pixels, row-major, four bytes per pixel.
#[derive(uniffi::Record)]
pub struct RgbaBitmap {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RgbaBitmap {
    fn into_image(self) -> Result<RgbaImage, OverlayError> {
        let expected = self.width as u64 * self.height as u64 * 4;
        let actual = self.data.len() as u64;
        if actual != expected {
            return Err(OverlayError::BufferSizeMismatch { expected, actual });
        }
        RgbaImage::from_raw(self.width, self.height, self.data)
            .ok_or(OverlayError::BufferSizeMismatch { expected, actual })
    }

    fn from_image(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.into_raw(),
        }
    }
}

#[derive(uniffi::Record)]
pub struct FacePoint {
    pub x: f32,
    pub y: f32,
}

#[derive(uniffi::Record)]
pub struct FaceDetectInfo {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub chin_bottom: FacePoint,
}

impl From<FaceDetectInfo> for clothoverlay::FaceDetectInfo {
    fn from(face: FaceDetectInfo) -> Self {
        clothoverlay::FaceDetectInfo {
            left: face.left,
            top: face.top,
            width: face.width,
            height: face.height,
            center_x: face.center_x,
            center_y: face.center_y,
            chin_bottom: clothoverlay::FacePoint {
                x: face.chin_bottom.x,
                y: face.chin_bottom.y,
            },
        }
    }
}

#[derive(uniffi::Record)]
pub struct DecodedMask {
    pub composited: RgbaBitmap,
    pub mask: RgbaBitmap,
    pub classes_found: Vec<u32>,
}

/// Resize to the model input and flatten into a normalized RGB tensor.
#[uniffi::export]
pub fn prepare_model_input(image: RgbaBitmap) -> Result<Vec<f32>, OverlayError> {
    let image = image.into_image()?;
    let size = clothoverlay::MODEL_INPUT_SIZE;
    let scaled = clothoverlay::resize_image(size, size, &image)?;
    Ok(clothoverlay::to_input_tensor(
        &scaled,
        size,
        size,
        clothoverlay::IMAGE_MEAN,
        clothoverlay::IMAGE_STD,
    )?)
}

/// Decode raw model scores against a background image.
///
/// `palette_seed` of `None` uses the process-wide palette.
#[uniffi::export]
pub fn decode_segmentation_mask(
    scores: Vec<f32>,
    width: u32,
    height: u32,
    num_classes: u32,
    background: RgbaBitmap,
    palette_seed: Option<u64>,
) -> Result<DecodedMask, OverlayError> {
    let scores = clothoverlay::ScoreBuffer::new(scores, width, height, num_classes)?;
    let background = background.into_image()?;
    let seeded;
    let palette = match palette_seed {
        Some(seed) => {
            seeded = clothoverlay::Palette::seeded(num_classes as usize, seed);
            &seeded
        }
        None => clothoverlay::Palette::global(),
    };

    let decoded = clothoverlay::decode_mask(&scores, palette, &background)?;
    Ok(DecodedMask {
        composited: RgbaBitmap::from_image(decoded.composited),
        mask: RgbaBitmap::from_image(decoded.mask),
        classes_found: decoded.classes_found.into_iter().collect(),
    })
}

/// Feather the mask edges and return the softened mask.
#[uniffi::export]
pub fn feather_mask(mask: RgbaBitmap, bottom_edge: BottomEdge) -> Result<RgbaBitmap, OverlayError> {
    let mut mask = mask.into_image()?;
    clothoverlay::feather_with(&mut mask, bottom_edge.into());
    Ok(RgbaBitmap::from_image(mask))
}

/// Scale an image to exactly `width` × `height`.
#[uniffi::export]
pub fn resize_image(
    image: RgbaBitmap,
    width: u32,
    height: u32,
) -> Result<RgbaBitmap, OverlayError> {
    let image = image.into_image()?;
    Ok(RgbaBitmap::from_image(clothoverlay::resize_image(
        width, height, &image,
    )?))
}

/// Cut the original image down to the mask's silhouette.
#[uniffi::export]
pub fn split_foreground(
    mask: RgbaBitmap,
    original: RgbaBitmap,
) -> Result<RgbaBitmap, OverlayError> {
    let mask = mask.into_image()?;
    let original = original.into_image()?;
    Ok(RgbaBitmap::from_image(clothoverlay::split_foreground(
        &mask, &original,
    )?))
}

/// Crop from the face's chin line to the bottom of the image.
#[uniffi::export]
pub fn crop_below_chin(
    image: RgbaBitmap,
    face: FaceDetectInfo,
) -> Result<RgbaBitmap, OverlayError> {
    let image = image.into_image()?;
    Ok(RgbaBitmap::from_image(clothoverlay::crop_below_chin(
        &image,
        &face.into(),
    )?))
}
