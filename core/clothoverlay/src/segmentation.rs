use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::OverlayError;
use crate::BoxError;

/// Semantic segmentation backend.
///
/// The model is a black box from a normalized RGB tensor to raw class scores.
/// Implement this over whatever runtime the host ships (TFLite, NNAPI, ONNX).
pub trait SegmentationModel: Send + Sync {
    /// Run inference on `input`, a row-major `height × width × 3` RGB tensor.
    ///
    /// Must return `height × width × num_classes` scores laid out
    /// `[row][col][class]`. Scores need not be normalized.
    fn segment(&self, input: &[f32], width: u32, height: u32) -> Result<Vec<f32>, BoxError>;
}

/// Convert an image into the model's input tensor.
///
/// The image is stretched to `width × height` if it is not already that size,
/// then each RGB channel becomes `(value - mean) / std`. Alpha is dropped.
pub fn to_input_tensor(
    image: &RgbaImage,
    width: u32,
    height: u32,
    mean: f32,
    std: f32,
) -> Result<Vec<f32>, OverlayError> {
    if width == 0 || height == 0 {
        return Err(OverlayError::InvalidDimension(format!(
            "model input {width}x{height}"
        )));
    }
    if image.width() == 0 || image.height() == 0 {
        return Err(OverlayError::InvalidDimension(format!(
            "tensor source {}x{}",
            image.width(),
            image.height()
        )));
    }
    if std == 0.0 {
        return Err(OverlayError::InvalidDimension(
            "normalization std must be non-zero".to_string(),
        ));
    }

    let stretched;
    let source = if image.dimensions() == (width, height) {
        image
    } else {
        stretched = image::imageops::resize(image, width, height, FilterType::Triangle);
        &stretched
    };

    let mut tensor = Vec::with_capacity(width as usize * height as usize * 3);
    for pixel in source.pixels() {
        let [r, g, b, _] = pixel.0;
        tensor.push((r as f32 - mean) / std);
        tensor.push((g as f32 - mean) / std);
        tensor.push((b as f32 - mean) / std);
    }
    Ok(tensor)
}
