//! Tolerant DICOM access
//!
//! Reads single files into [`ImageRecord`]s with an explicit default for
//! every missing attribute.

pub mod record;
pub mod tags;

pub use record::{collect_dicom_files, is_dicom_candidate, ImageRecord, UNKNOWN_SERIES};
pub use tags::*;
