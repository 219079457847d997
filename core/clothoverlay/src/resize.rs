use image::imageops::FilterType;
use image::RgbaImage;

use crate::error::OverlayError;

/// Resize `source` to the target resolution with bilinear smoothing.
///
/// The scale factor is taken from the target's own width and height ratios,
/// so for any valid target it is exactly 1.0 and the output has the target
/// dimensions regardless of the source aspect ratio.
pub fn resize_image(
    target_width: u32,
    target_height: u32,
    source: &RgbaImage,
) -> Result<RgbaImage, OverlayError> {
    if target_width == 0 || target_height == 0 {
        return Err(OverlayError::InvalidDimension(format!(
            "resize target {target_width}x{target_height}"
        )));
    }
    if source.width() == 0 || source.height() == 0 {
        return Err(OverlayError::InvalidDimension(format!(
            "resize source {}x{}",
            source.width(),
            source.height()
        )));
    }

    let (new_w, new_h) = scaled_dimensions(target_width, target_height);
    tracing::trace!(
        src_w = source.width(),
        src_h = source.height(),
        new_w,
        new_h,
        "resizing image"
    );

    Ok(image::imageops::resize(
        source,
        new_w,
        new_h,
        FilterType::Triangle,
    ))
}

/// Output dimensions for a resize to `target_width` × `target_height`.
pub(crate) fn scaled_dimensions(target_width: u32, target_height: u32) -> (u32, u32) {
    let scale_factor = scale_factor(target_width, target_height);
    (
        (target_width as f32 / scale_factor) as u32,
        (target_height as f32 / scale_factor) as u32,
    )
}

fn scale_factor(target_width: u32, target_height: u32) -> f32 {
    let (w, h) = (target_width as f32, target_height as f32);
    (w / w).max(h / h)
}
