use dicom_core::Tag;
use dicom_object::InMemDicomObject;

// Core Image Tags
pub use dicom_dictionary_std::tags::{COLUMNS, MODALITY, PHOTOMETRIC_INTERPRETATION, ROWS};

// Pixel Module Tags
pub use dicom_dictionary_std::tags::{
    BITS_ALLOCATED, BITS_STORED, HIGH_BIT, PIXEL_DATA, PIXEL_REPRESENTATION, SAMPLES_PER_PIXEL,
};

// Series/Instance Identification Tags
pub use dicom_dictionary_std::tags::{INSTANCE_NUMBER, SERIES_INSTANCE_UID};

// Spatial Tags
pub use dicom_dictionary_std::tags::{IMAGE_POSITION_PATIENT, SLICE_LOCATION};

// Calibration Tags
pub use dicom_dictionary_std::tags::{RESCALE_INTERCEPT, RESCALE_SLOPE};

/// Helper to get string value from DICOM tag
///
/// Padding (spaces, and the NUL used by UIDs) is stripped. Returns `None` if
/// the tag is not present or cannot be converted to string
pub fn get_string_value(dcm: &InMemDicomObject, tag: Tag) -> Option<String> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_str().ok())
        .map(|s| s.trim_matches(|c: char| c.is_whitespace() || c == '\0').to_string())
}

/// Helper to get integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to i32
pub fn get_int_value(dcm: &InMemDicomObject, tag: Tag) -> Option<i32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<i32>().ok())
}

/// Helper to get a floating point value from DICOM tag
///
/// Decimal strings (DS) are parsed. Returns `None` if the tag is not present
/// or cannot be converted to f64
pub fn get_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<f64> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_float64().ok())
}

/// Helper to get multi-valued floating point values from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to Vec<f64>
pub fn get_multi_float_value(dcm: &InMemDicomObject, tag: Tag) -> Option<Vec<f64>> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_multi_float64().ok())
}
