use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("score buffer holds {actual} values, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("image dimensions differ: {expected:?} vs {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("crop line y={chin_y} is outside an image of height {height}")]
    InvalidCropRegion { chin_y: f32, height: u32 },

    #[error("no face found in the clothes image")]
    FaceNotFound,

    #[error("segmentation inference failed: {0}")]
    InferenceFailure(String),

    #[error("face detection failed: {0}")]
    DetectionFailure(String),

    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("palette has {colors} colors but the model emits {classes} classes")]
    PaletteTooSmall { colors: usize, classes: usize },
}
