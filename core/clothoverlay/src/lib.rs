//! Clothing overlay post-processing: turn a segmentation model's raw class
//! scores into a feathered, background-free clothes image cropped below the
//! wearer's chin, ready to hang under a tracked face.
//!
//! The model and the face detector are host collaborators plugged in through
//! [`SegmentationModel`] and [`FaceDetector`]; every stage in between is
//! plain array work and is also exported on its own.
//!
//! # Example
//!
//! ```no_run
//! use clothoverlay::{BoxError, ClothesOverlay, FaceDetectInfo, FaceDetector, SegmentationModel};
//!
//! struct Model;
//! impl SegmentationModel for Model {
//!     fn segment(&self, input: &[f32], width: u32, height: u32) -> Result<Vec<f32>, BoxError> {
//!         // Run your inference runtime here
//!         # let _ = (input, width, height);
//!         unimplemented!()
//!     }
//! }
//!
//! struct Detector;
//! impl FaceDetector for Detector {
//!     fn detect(&self, image: &image::RgbaImage) -> Result<Vec<FaceDetectInfo>, BoxError> {
//!         # let _ = image;
//!         unimplemented!()
//!     }
//! }
//!
//! let clothes = std::fs::read("clothes.png").unwrap();
//! let overlay = ClothesOverlay::new(clothes)
//!     .unwrap()
//!     .process(&Model, &Detector)
//!     .unwrap();
//! println!("overlay {}x{}", overlay.image.width(), overlay.image.height());
//! ```

use std::collections::BTreeSet;

use image::RgbaImage;

mod compose;
mod crop;
mod error;
/// Face detection trait and data types.
pub mod face_detector;
mod feather;
mod mask;
mod palette;
mod pipeline;
mod renderer;
mod resize;
mod segmentation;

pub use compose::{source_over, split_foreground};
pub use crop::{below_chin_region, crop_below_chin, CropRegion};
/// Error type returned by clothoverlay operations.
pub use error::OverlayError;
pub use face_detector::{
    chin_from_face_contour, FaceDetectInfo, FaceDetector, FacePoint, CHIN_CONTOUR_INDEX,
};
pub use feather::{
    feather, feather_edge, feather_with, find_seeds, BottomEdge, ColorPoint, Edge,
};
pub use mask::{decode_mask, label_map, DecodedMask, LabelMap, ScoreBuffer};
pub use palette::{Palette, TRANSPARENT};
pub use renderer::OverlayRenderer;
pub use resize::resize_image;
pub use segmentation::{to_input_tensor, SegmentationModel};

/// Side length of the segmentation model's square input.
pub const MODEL_INPUT_SIZE: u32 = 257;

/// Number of classes the segmentation model scores.
pub const NUM_CLASSES: usize = 21;

/// Mean subtracted from each 0-255 channel before inference.
pub const IMAGE_MEAN: f32 = 128.0;

/// Divisor applied to each channel after subtracting the mean.
pub const IMAGE_STD: f32 = 128.0;

/// Maximum pixels written per feathering seed, the seed included.
pub const FEATHER_STEPS: u32 = 9;

/// Alpha removed per pixel while feathering.
pub const FEATHER_ALPHA_STEP: i32 = 42;

/// Opaque error returned by host collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A finished overlay, ready for the AR renderer.
#[derive(Debug, Clone)]
pub struct OverlayResult {
    /// Background-free clothes image starting at the chin line.
    pub image: RgbaImage,

    /// Width of the detected face's bounding box, in clothes image pixels.
    pub rect_width: f32,

    /// Chin-bottom landmark the image was cropped at.
    pub chin_bottom: FacePoint,

    /// Classes the segmentation model reported anywhere in the image.
    pub classes_found: BTreeSet<u32>,
}

/// Builder for processing a clothes image into an overlay.
///
/// Holds the decoded clothes image and the post-processing settings. Each
/// call to [`process`](Self::process) is an independent request.
#[derive(Debug, Clone)]
pub struct ClothesOverlay {
    clothes: RgbaImage,
    /// `None` selects the process-wide palette.
    palette: Option<Palette>,
    feathering: bool,
    bottom_edge: BottomEdge,
}

impl ClothesOverlay {
    /// Create a new overlay builder from raw image bytes (PNG, JPEG, or WebP).
    pub fn new(input: Vec<u8>) -> Result<Self, OverlayError> {
        let clothes = pipeline::decode_image(&input)?;
        Self::from_image(clothes)
    }

    /// Create a new overlay builder from already decoded pixels.
    pub fn from_image(clothes: RgbaImage) -> Result<Self, OverlayError> {
        if clothes.width() == 0 || clothes.height() == 0 {
            return Err(OverlayError::InvalidDimension(
                "clothes image is empty".to_string(),
            ));
        }
        Ok(Self {
            clothes,
            palette: None,
            feathering: true,
            bottom_edge: BottomEdge::default(),
        })
    }

    /// Use a specific palette instead of the process-wide one.
    ///
    /// Handy in tests, where [`Palette::seeded`] gives reproducible colors.
    pub fn palette(mut self, palette: Palette) -> Self {
        self.palette = Some(palette);
        self
    }

    /// Enable or disable edge feathering of the mask (default: enabled).
    pub fn feathering(mut self, enable: bool) -> Self {
        self.feathering = enable;
        self
    }

    /// Set how the bottom edge is feathered (default: [`BottomEdge::Symmetric`]).
    pub fn bottom_edge(mut self, mode: BottomEdge) -> Self {
        self.bottom_edge = mode;
        self
    }

    /// The decoded clothes image.
    pub fn clothes(&self) -> &RgbaImage {
        &self.clothes
    }

    fn active_palette(&self) -> &Palette {
        self.palette.as_ref().unwrap_or_else(|| Palette::global())
    }

    /// Run segmentation only and return the decoded mask at model resolution.
    pub fn segment(&self, model: &dyn SegmentationModel) -> Result<DecodedMask, OverlayError> {
        pipeline::segment_clothes(&self.clothes, model, self.active_palette())
    }

    /// Produce the overlay: detect the face, segment, feather, cut out, crop.
    pub fn process(
        &self,
        model: &dyn SegmentationModel,
        detector: &dyn FaceDetector,
    ) -> Result<OverlayResult, OverlayError> {
        pipeline::overlay_pipeline(
            &self.clothes,
            model,
            detector,
            self.active_palette(),
            self.feathering,
            self.bottom_edge,
        )
    }

    /// [`process`](Self::process), then hand the result to `renderer`.
    ///
    /// On error the renderer is not called and the caller should show no overlay.
    pub fn process_and_present(
        &self,
        model: &dyn SegmentationModel,
        detector: &dyn FaceDetector,
        renderer: &mut dyn OverlayRenderer,
    ) -> Result<(), OverlayError> {
        let overlay = self.process(model, detector)?;
        renderer.present(&overlay);
        Ok(())
    }
}
