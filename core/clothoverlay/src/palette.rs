use std::time::{SystemTime, UNIX_EPOCH};

use image::Rgba;
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::NUM_CLASSES;

/// Fully transparent color reserved for the background class.
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

static GLOBAL_PALETTE: OnceCell<Palette> = OnceCell::new();

/// Mapping from class index to the color painted into the mask.
///
/// Class 0 is the background and is always [`TRANSPARENT`]. Every other
/// class gets one opaque color for the lifetime of the palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    /// Build a palette from the colors of classes `1..`, in order.
    pub fn new(foreground: impl IntoIterator<Item = [u8; 3]>) -> Self {
        let colors = std::iter::once(TRANSPARENT)
            .chain(foreground.into_iter().map(|[r, g, b]| Rgba([r, g, b, 255])))
            .collect();
        Self { colors }
    }

    /// Random opaque colors for `num_classes` classes drawn from `rng`.
    pub fn random<R: Rng + ?Sized>(num_classes: usize, rng: &mut R) -> Self {
        let foreground: Vec<[u8; 3]> = (1..num_classes)
            .map(|_| [random_channel(rng), random_channel(rng), random_channel(rng)])
            .collect();
        Self::new(foreground)
    }

    /// Deterministic random palette; the same seed always yields the same colors.
    pub fn seeded(num_classes: usize, seed: u64) -> Self {
        Self::random(num_classes, &mut StdRng::seed_from_u64(seed))
    }

    /// The process-wide palette for [`NUM_CLASSES`] classes.
    ///
    /// Randomized on first use from the wall clock and fixed afterwards. The
    /// seed is logged at debug level so a run's colors can be reproduced with
    /// [`Palette::seeded`].
    pub fn global() -> &'static Palette {
        GLOBAL_PALETTE.get_or_init(|| {
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default();
            tracing::debug!(seed, classes = NUM_CLASSES, "initializing segment palette");
            Palette::seeded(NUM_CLASSES, seed)
        })
    }

    /// Number of classes this palette can color.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True when the palette has no colors at all.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color for `class`, transparent when the class is out of range.
    pub fn color(&self, class: usize) -> Rgba<u8> {
        self.colors.get(class).copied().unwrap_or(TRANSPARENT)
    }
}

fn random_channel<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    (255.0 * rng.gen::<f32>()) as u8
}
