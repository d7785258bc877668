//! Core type definitions for L3 slice extraction
//!
//! This module provides the configuration and calibration types used
//! throughout the l3extract library:
//! - [`LumbarBand`]: Fractional craniocaudal band plus slice-count guardrails
//! - [`DisplayWindow`]: Window level/width for mapping HU onto 8-bit intensities
//! - [`ExtractConfig`]: Everything a run needs, with validation
//! - [`Rescale`]: Per-image slope/intercept calibration

mod config;
mod rescale;

pub use config::{DisplayWindow, ExtractConfig, LumbarBand};
pub use rescale::Rescale;
