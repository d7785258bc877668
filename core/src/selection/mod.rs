//! Slice selection
//!
//! Turns a patient's parsed records into the stack positions to extract:
//! primary series, spatial ordering, then the L3 band with guardrails.

mod lumbar;
mod series;
mod stack;

pub use lumbar::{
    apply_guardrails, band_selection, select_from_positions, select_lumbar_indices,
    L3_PRIOR_FRAC, MIN_HALF_WIDTH, SPATIAL_EXTENT_THRESHOLD,
};
pub use series::{group_series, select_primary_series, SeriesGroup};
pub use stack::{has_spatial_order, sort_stack};
