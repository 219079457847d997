use crate::OverlayResult;

/// Consumer of finished overlays, typically the AR scene node anchored under
/// the tracked face.
///
/// The pipeline only hands results over; placement, scaling and display are
/// the renderer's business.
pub trait OverlayRenderer {
    fn present(&mut self, overlay: &OverlayResult);
}

impl<F: FnMut(&OverlayResult)> OverlayRenderer for F {
    fn present(&mut self, overlay: &OverlayResult) {
        self(overlay)
    }
}
