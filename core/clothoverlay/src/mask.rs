use std::collections::BTreeSet;

use image::RgbaImage;

use crate::compose::source_over;
use crate::error::OverlayError;
use crate::palette::Palette;

/// Raw per-pixel class scores laid out `[row][col][class]`, row-major.
#[derive(Debug, Clone)]
pub struct ScoreBuffer {
    data: Vec<f32>,
    width: u32,
    height: u32,
    num_classes: u32,
}

impl ScoreBuffer {
    /// Wrap model output, checking `data.len() == height * width * num_classes`.
    pub fn new(
        data: Vec<f32>,
        width: u32,
        height: u32,
        num_classes: u32,
    ) -> Result<Self, OverlayError> {
        if width == 0 || height == 0 || num_classes == 0 {
            return Err(OverlayError::InvalidDimension(format!(
                "score buffer {width}x{height}x{num_classes}"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(num_classes as usize))
            .ok_or_else(|| {
                OverlayError::InvalidDimension(format!(
                    "score buffer {width}x{height}x{num_classes} overflows"
                ))
            })?;
        if data.len() != expected {
            return Err(OverlayError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            num_classes,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_classes(&self) -> u32 {
        self.num_classes
    }

    /// All class scores at pixel (x, y).
    pub fn scores_at(&self, x: u32, y: u32) -> &[f32] {
        let c = self.num_classes as usize;
        let start = (y as usize * self.width as usize + x as usize) * c;
        &self.data[start..start + c]
    }

    /// Winning class at (x, y). Class 0 is the baseline and only a strictly
    /// greater score replaces the current best, so ties go to the lowest index.
    pub fn argmax_at(&self, x: u32, y: u32) -> u32 {
        let scores = self.scores_at(x, y);
        let mut best_class = 0;
        let mut best_score = scores[0];
        for (class, &score) in scores.iter().enumerate().skip(1) {
            if score > best_score {
                best_score = score;
                best_class = class;
            }
        }
        best_class as u32
    }
}

/// Winning class index for every pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
}

impl LabelMap {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Class at (x, y), or `None` outside the map.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.labels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Labels as rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.labels.chunks(self.width as usize)
    }
}

/// Output of [`decode_mask`].
#[derive(Debug, Clone)]
pub struct DecodedMask {
    /// Class colors composited over the background image.
    pub composited: RgbaImage,
    /// Class colors alone; background class pixels are transparent.
    pub mask: RgbaImage,
    /// Winning class per pixel.
    pub labels: LabelMap,
    /// Every class that won at least one pixel. Diagnostics only.
    pub classes_found: BTreeSet<u32>,
}

/// Argmax class for every pixel of `scores`.
pub fn label_map(scores: &ScoreBuffer) -> LabelMap {
    let (width, height) = (scores.width(), scores.height());
    let mut labels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            labels.push(scores.argmax_at(x, y));
        }
    }
    LabelMap {
        width,
        height,
        labels,
    }
}

/// Decode a score buffer into a colorized mask and a background composite.
pub fn decode_mask(
    scores: &ScoreBuffer,
    palette: &Palette,
    background: &RgbaImage,
) -> Result<DecodedMask, OverlayError> {
    let (width, height) = (scores.width(), scores.height());
    if background.dimensions() != (width, height) {
        return Err(OverlayError::DimensionMismatch {
            expected: (width, height),
            actual: background.dimensions(),
        });
    }
    if palette.len() < scores.num_classes() as usize {
        return Err(OverlayError::PaletteTooSmall {
            colors: palette.len(),
            classes: scores.num_classes() as usize,
        });
    }

    let labels = label_map(scores);
    let mut mask = RgbaImage::new(width, height);
    let mut composited = RgbaImage::new(width, height);
    let mut classes_found = BTreeSet::new();

    for (y, row) in labels.rows().enumerate() {
        let y = y as u32;
        for (x, &class) in row.iter().enumerate() {
            let x = x as u32;
            classes_found.insert(class);
            let color = palette.color(class as usize);
            mask.put_pixel(x, y, color);
            composited.put_pixel(x, y, source_over(color, *background.get_pixel(x, y)));
        }
    }

    tracing::trace!(?classes_found, width, height, "decoded segmentation mask");

    Ok(DecodedMask {
        composited,
        mask,
        labels,
        classes_found,
    })
}
