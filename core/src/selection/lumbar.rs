//! L3 band selection
//!
//! Approximates the third lumbar vertebra as a fractional band of the scan's
//! craniocaudal extent. No segmentation is involved: the heuristic only looks
//! at slice positions, then guardrails bound the number of selected slices.

use crate::extraction::ImageRecord;
use crate::types::LumbarBand;

/// Minimum craniocaudal extent (mm) for the normalized-Z band to be trusted
pub const SPATIAL_EXTENT_THRESHOLD: f64 = 50.0;

/// Prior L3 location as a fraction of the stack, used when nothing was selected
pub const L3_PRIOR_FRAC: f64 = 0.68;

/// Lower bound on the half-width used when re-centering
pub const MIN_HALF_WIDTH: usize = 4;

/// Selects the stack positions covering the L3 band
///
/// # Arguments
///
/// * `stack` - Sorted stack (see [`crate::selection::sort_stack`])
/// * `band` - Fractional band and guardrails
///
/// # Returns
///
/// Ascending, deduplicated positions into `stack`
pub fn select_lumbar_indices(stack: &[ImageRecord], band: &LumbarBand) -> Vec<usize> {
    let positions: Vec<f64> = stack.iter().map(|r| r.z_position).collect();
    select_from_positions(&positions, band)
}

/// Same as [`select_lumbar_indices`] on raw Z positions of a sorted stack
///
/// # Algorithm
///
/// 1. All Z finite and extent > 50: normalize Z to [0, 1] and keep positions
///    inside `[low_frac, high_frac]` inclusive
/// 2. Otherwise keep `floor(low_frac * N) ..= floor(high_frac * N)`
/// 3. Fewer than `min_slices`: re-center on the selection's middle element
///    (or `floor(0.68 * N)` when empty) with half-width `max(min/2, 4)`
/// 4. More than `max_slices`: keep every `count / max`-th, truncated to max
pub fn select_from_positions(positions: &[f64], band: &LumbarBand) -> Vec<usize> {
    let n = positions.len();
    if n == 0 {
        return Vec::new();
    }

    let raw = band_selection(positions, band);
    let mut selected = apply_guardrails(raw, n, band);
    selected.sort_unstable();
    selected.dedup();
    selected
}

/// Raw band selection, before any guardrail
pub fn band_selection(positions: &[f64], band: &LumbarBand) -> Vec<usize> {
    match craniocaudal_extent(positions) {
        Some((z_min, extent)) if extent > SPATIAL_EXTENT_THRESHOLD => positions
            .iter()
            .enumerate()
            .filter(|(_, z)| {
                let normalized = (**z - z_min) / extent;
                normalized >= band.low_frac && normalized <= band.high_frac
            })
            .map(|(i, _)| i)
            .collect(),
        _ => fraction_selection(positions.len(), band),
    }
}

/// Minimum Z and total extent, or `None` if any position is not finite
fn craniocaudal_extent(positions: &[f64]) -> Option<(f64, f64)> {
    if positions.is_empty() || !positions.iter().all(|z| z.is_finite()) {
        return None;
    }
    let z_min = positions.iter().copied().fold(f64::INFINITY, f64::min);
    let z_max = positions.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((z_min, z_max - z_min))
}

/// Index-fraction fallback
///
/// Both ends are inclusive, so this can hold one slice more than a
/// half-open range over the same fractions. Kept that way on purpose.
fn fraction_selection(n: usize, band: &LumbarBand) -> Vec<usize> {
    let lo = (band.low_frac * n as f64).floor() as usize;
    let hi = ((band.high_frac * n as f64).floor() as usize).min(n - 1);
    if lo > hi {
        return Vec::new();
    }
    (lo..=hi).collect()
}

/// Enforces the min/max slice-count guardrails on a raw selection
///
/// `selected` must be ascending and `n` must be non-zero.
pub fn apply_guardrails(selected: Vec<usize>, n: usize, band: &LumbarBand) -> Vec<usize> {
    let mut selected = selected;

    if selected.len() < band.min_slices {
        let center = if selected.is_empty() {
            ((L3_PRIOR_FRAC * n as f64).floor() as usize).min(n - 1)
        } else {
            selected[selected.len() / 2]
        };
        let half = (band.min_slices / 2).max(MIN_HALF_WIDTH);
        let start = center.saturating_sub(half);
        let end = (center + half).min(n - 1);
        selected = (start..=end).collect();
    }

    if selected.len() > band.max_slices {
        let stride = (selected.len() / band.max_slices.max(1)).max(1);
        selected = selected
            .into_iter()
            .step_by(stride)
            .take(band.max_slices)
            .collect();
    }

    selected
}
