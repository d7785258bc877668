use crate::error::{L3Error, Result};

/// Fractional craniocaudal band and slice-count guardrails for L3 selection
///
/// Fractions are measured from the head end of the sorted stack, so `0.60`
/// means 60% of the way from the most cranial slice.
///
/// # Example
///
/// ```
/// use l3extract_core::LumbarBand;
///
/// let band = LumbarBand::default();
/// assert_eq!(band.low_frac, 0.60);
/// assert_eq!(band.high_frac, 0.75);
/// assert_eq!(band.min_slices, 8);
/// assert_eq!(band.max_slices, 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LumbarBand {
    /// Lower bound of the band, inclusive
    pub low_frac: f64,

    /// Upper bound of the band, inclusive
    pub high_frac: f64,

    /// Guardrail: fewer selected slices than this triggers re-centering
    pub min_slices: usize,

    /// Guardrail: more selected slices than this triggers downsampling
    pub max_slices: usize,
}

impl Default for LumbarBand {
    fn default() -> Self {
        Self {
            low_frac: 0.60,
            high_frac: 0.75,
            min_slices: 8,
            max_slices: 20,
        }
    }
}

impl LumbarBand {
    /// Builder: Set the fractional band
    pub fn with_fractions(mut self, low_frac: f64, high_frac: f64) -> Self {
        self.low_frac = low_frac;
        self.high_frac = high_frac;
        self
    }

    /// Builder: Set the slice-count guardrails
    pub fn with_limits(mut self, min_slices: usize, max_slices: usize) -> Self {
        self.min_slices = min_slices;
        self.max_slices = max_slices;
        self
    }

    /// Checks the band is usable
    ///
    /// # Errors
    ///
    /// Returns [`L3Error::InvalidConfig`] if a fraction lies outside [0, 1],
    /// the band is inverted, or the guardrails are inconsistent
    pub fn validate(&self) -> Result<()> {
        for (name, frac) in [("low_frac", self.low_frac), ("high_frac", self.high_frac)] {
            if !(0.0..=1.0).contains(&frac) {
                return Err(L3Error::InvalidConfig(format!(
                    "{} must lie in [0, 1], got {}",
                    name, frac
                )));
            }
        }
        if self.low_frac > self.high_frac {
            return Err(L3Error::InvalidConfig(format!(
                "low_frac ({}) exceeds high_frac ({})",
                self.low_frac, self.high_frac
            )));
        }
        if self.max_slices == 0 {
            return Err(L3Error::InvalidConfig(
                "max_slices must be at least 1".to_string(),
            ));
        }
        if self.min_slices > self.max_slices {
            return Err(L3Error::InvalidConfig(format!(
                "min_slices ({}) exceeds max_slices ({})",
                self.min_slices, self.max_slices
            )));
        }
        Ok(())
    }
}

/// Display window (WL/WW) mapping a Hounsfield range onto 0-255
///
/// The default is a soft-tissue window suited to muscle contrast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayWindow {
    /// Window center in HU
    pub level: f32,

    /// Total window span in HU
    pub width: f32,
}

impl Default for DisplayWindow {
    fn default() -> Self {
        Self {
            level: 40.0,
            width: 400.0,
        }
    }
}

impl DisplayWindow {
    /// Creates a new window
    pub fn new(level: f32, width: f32) -> Self {
        Self { level, width }
    }

    /// Lower and upper HU bounds of the window
    pub fn bounds(&self) -> (f32, f32) {
        (
            self.level - self.width / 2.0,
            self.level + self.width / 2.0,
        )
    }
}

/// Full configuration for an extraction run
///
/// # Example
///
/// ```
/// use l3extract_core::{DisplayWindow, ExtractConfig, LumbarBand};
///
/// let config = ExtractConfig::default()
///     .with_band(LumbarBand::default().with_limits(4, 12))
///     .with_window(DisplayWindow::new(50.0, 350.0));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.min_series_slices, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractConfig {
    /// L3 band and guardrails
    pub band: LumbarBand,

    /// Display window applied to every saved slice
    pub window: DisplayWindow,

    /// Minimum number of slices for a series to qualify (filters scouts)
    pub min_series_slices: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            band: LumbarBand::default(),
            window: DisplayWindow::default(),
            min_series_slices: 10,
        }
    }
}

impl ExtractConfig {
    /// Builder: Set the lumbar band
    pub fn with_band(mut self, band: LumbarBand) -> Self {
        self.band = band;
        self
    }

    /// Builder: Set the display window
    pub fn with_window(mut self, window: DisplayWindow) -> Self {
        self.window = window;
        self
    }

    /// Builder: Set the minimum series size
    pub fn with_min_series_slices(mut self, min_series_slices: usize) -> Self {
        self.min_series_slices = min_series_slices;
        self
    }

    /// Validates every part of the configuration
    ///
    /// # Errors
    ///
    /// Returns [`L3Error::InvalidConfig`] describing the first problem found
    pub fn validate(&self) -> Result<()> {
        self.band.validate()?;
        if !(self.window.width > 0.0) {
            return Err(L3Error::InvalidConfig(format!(
                "window width must be positive, got {}",
                self.window.width
            )));
        }
        if !self.window.level.is_finite() {
            return Err(L3Error::InvalidConfig(
                "window level must be finite".to_string(),
            ));
        }
        if self.min_series_slices == 0 {
            return Err(L3Error::InvalidConfig(
                "min_series_slices must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
