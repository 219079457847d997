//! Alpha compositing on straight-alpha RGBA pixels.

use image::{Rgba, RgbaImage};

use crate::error::OverlayError;
use crate::palette::TRANSPARENT;

/// Source-over composite of `foreground` onto `background`.
///
/// Integer arithmetic on straight alpha, so results match the host
/// platform's color utilities bit for bit.
pub fn source_over(foreground: Rgba<u8>, background: Rgba<u8>) -> Rgba<u8> {
    let fg_a = foreground.0[3] as u32;
    let bg_a = background.0[3] as u32;
    let a = 255 - ((255 - bg_a) * (255 - fg_a)) / 255;

    let channel = |i: usize| -> u8 {
        if a == 0 {
            return 0;
        }
        let fg_c = foreground.0[i] as u32;
        let bg_c = background.0[i] as u32;
        ((255 * fg_c * fg_a + bg_c * bg_a * (255 - fg_a)) / (a * 255)) as u8
    };

    Rgba([channel(0), channel(1), channel(2), a as u8])
}

/// Cut the foreground out of `original` using `mask` as a stencil.
///
/// Each output pixel keeps the original's color and takes the mask's
/// alpha. Pixels the mask leaves fully transparent come out fully
/// transparent whatever the original holds there. The original's own alpha
/// is not multiplied in, so transparent areas inside the mask come out with
/// the mask's opacity.
pub fn split_foreground(mask: &RgbaImage, original: &RgbaImage) -> Result<RgbaImage, OverlayError> {
    if mask.dimensions() != original.dimensions() {
        return Err(OverlayError::DimensionMismatch {
            expected: original.dimensions(),
            actual: mask.dimensions(),
        });
    }

    let mut result = RgbaImage::new(original.width(), original.height());
    for ((out, stencil), source) in result
        .pixels_mut()
        .zip(mask.pixels())
        .zip(original.pixels())
    {
        let alpha = stencil.0[3];
        *out = if alpha == 0 {
            TRANSPARENT
        } else {
            let [r, g, b, _] = source.0;
            Rgba([r, g, b, alpha])
        };
    }

    Ok(result)
}
