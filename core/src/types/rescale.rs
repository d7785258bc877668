use std::fmt;

/// Linear modality rescale mapping stored pixel values to Hounsfield Units
///
/// `hu = raw * slope + intercept`. Missing DICOM attributes fall back to the
/// identity transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f64,
    pub intercept: f64,
}

impl Default for Rescale {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

impl Rescale {
    /// Creates a new Rescale
    pub fn new(slope: f64, intercept: f64) -> Self {
        Self { slope, intercept }
    }

    /// Applies the rescale to one stored value
    pub fn apply(&self, raw: i32) -> f32 {
        raw as f32 * self.slope as f32 + self.intercept as f32
    }
}

impl fmt::Display for Rescale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x * {} + {}", self.slope, self.intercept)
    }
}
