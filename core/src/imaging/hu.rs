use crate::types::{DisplayWindow, Rescale};
use ndarray::Array2;

/// Guards against division by zero for degenerate windows
pub const MIN_WINDOW_SPAN: f32 = 1e-6;

/// Converts stored pixel values to Hounsfield Units
///
/// `hu = raw * slope + intercept`, computed in `f32`.
pub fn to_hu(pixels: &Array2<i32>, rescale: Rescale) -> Array2<f32> {
    pixels.mapv(|raw| rescale.apply(raw))
}

/// Maps HU values onto 8-bit display intensities
///
/// Values are clipped to `[level - width/2, level + width/2]`, normalized by
/// the window span (at least [`MIN_WINDOW_SPAN`]) and scaled to 0-255 with
/// truncation. Pure: identical inputs always give identical outputs.
pub fn window(hu: &Array2<f32>, display: DisplayWindow) -> Array2<u8> {
    let (lo, hi) = display.bounds();
    let span = (hi - lo).max(MIN_WINDOW_SPAN);
    hu.mapv(|value| {
        let normalized = (value.max(lo).min(hi) - lo) / span;
        (normalized * 255.0) as u8
    })
}
