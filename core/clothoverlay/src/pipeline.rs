use std::time::Instant;

use image::RgbaImage;

use crate::compose::split_foreground;
use crate::crop::crop_below_chin;
use crate::error::OverlayError;
use crate::face_detector::{FaceDetectInfo, FaceDetector};
use crate::feather::{feather_with, BottomEdge};
use crate::mask::{decode_mask, DecodedMask, ScoreBuffer};
use crate::palette::Palette;
use crate::resize::resize_image;
use crate::segmentation::{to_input_tensor, SegmentationModel};
use crate::{OverlayResult, IMAGE_MEAN, IMAGE_STD, MODEL_INPUT_SIZE, NUM_CLASSES};

/// Decode input bytes (PNG, JPEG or WebP) into RGBA pixels.
pub(crate) fn decode_image(input: &[u8]) -> Result<RgbaImage, OverlayError> {
    let decoded =
        image::load_from_memory(input).map_err(|e| OverlayError::DecodeError(e.to_string()))?;
    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(OverlayError::InvalidDimension(
            "decoded image is empty".to_string(),
        ));
    }
    Ok(decoded.to_rgba8())
}

/// First face the detector reports, or [`OverlayError::FaceNotFound`].
pub(crate) fn first_face(
    detector: &dyn FaceDetector,
    image: &RgbaImage,
) -> Result<FaceDetectInfo, OverlayError> {
    let faces = detector.detect(image).map_err(|e| {
        tracing::warn!(error = %e, "face detector failed");
        OverlayError::DetectionFailure(e.to_string())
    })?;

    match faces.into_iter().next() {
        Some(face) => {
            tracing::debug!(?face, "using first detected face");
            Ok(face)
        }
        None => {
            tracing::warn!("no face detected in clothes image");
            Err(OverlayError::FaceNotFound)
        }
    }
}

/// Run the segmentation model on `clothes` and decode its output.
///
/// The image is resized to the model's square input, normalized, scored,
/// and the scores are decoded against the resized image.
pub(crate) fn segment_clothes(
    clothes: &RgbaImage,
    model: &dyn SegmentationModel,
    palette: &Palette,
) -> Result<DecodedMask, OverlayError> {
    let started = Instant::now();

    let preprocess_started = Instant::now();
    let scaled = resize_image(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, clothes)?;
    let input = to_input_tensor(
        &scaled,
        MODEL_INPUT_SIZE,
        MODEL_INPUT_SIZE,
        IMAGE_MEAN,
        IMAGE_STD,
    )?;
    let preprocess_ms = preprocess_started.elapsed().as_millis();

    let inference_started = Instant::now();
    let raw = model
        .segment(&input, MODEL_INPUT_SIZE, MODEL_INPUT_SIZE)
        .map_err(|e| {
            tracing::warn!(error = %e, "segmentation model failed");
            OverlayError::InferenceFailure(e.to_string())
        })?;
    let inference_ms = inference_started.elapsed().as_millis();

    let flatten_started = Instant::now();
    let scores = ScoreBuffer::new(raw, MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, NUM_CLASSES as u32)?;
    let decoded = decode_mask(&scores, palette, &scaled)?;
    let flatten_ms = flatten_started.elapsed().as_millis();

    tracing::debug!(
        preprocess_ms,
        inference_ms,
        flatten_ms,
        total_ms = started.elapsed().as_millis(),
        "segmentation finished"
    );

    Ok(decoded)
}

/// Full overlay pipeline: detect → segment → feather → resize → split → crop.
pub(crate) fn overlay_pipeline(
    clothes: &RgbaImage,
    model: &dyn SegmentationModel,
    detector: &dyn FaceDetector,
    palette: &Palette,
    feathering: bool,
    bottom_edge: BottomEdge,
) -> Result<OverlayResult, OverlayError> {
    let face = first_face(detector, clothes)?;

    let DecodedMask {
        mut mask,
        classes_found,
        ..
    } = segment_clothes(clothes, model, palette)?;

    if feathering {
        feather_with(&mut mask, bottom_edge);
    }

    let full_mask = resize_image(clothes.width(), clothes.height(), &mask)?;
    let cut_out = split_foreground(&full_mask, clothes)?;
    let image = crop_below_chin(&cut_out, &face)?;

    tracing::info!(
        width = image.width(),
        height = image.height(),
        ?classes_found,
        "clothes overlay ready"
    );

    Ok(OverlayResult {
        image,
        rect_width: face.width,
        chin_bottom: face.chin_bottom,
        classes_found,
    })
}
