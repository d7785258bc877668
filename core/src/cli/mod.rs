pub mod report;

use crate::types::{DisplayWindow, ExtractConfig, LumbarBand};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for l3extract
#[derive(Parser, Debug)]
#[command(name = "l3extract")]
#[command(about = "Extract L3-level axial CT slices as windowed PNG images")]
#[command(version)]
pub struct Cli {
    /// Dataset root containing one directory per patient
    #[arg(long, value_name = "DIR")]
    pub input: PathBuf,

    /// Destination root for per-patient slice directories
    #[arg(long, value_name = "DIR", default_value = "outputs/l3_slices")]
    pub output: PathBuf,

    /// Destination for preview montages (used with --preview)
    #[arg(long, value_name = "DIR", default_value = "outputs/figures")]
    pub figures: PathBuf,

    /// Path of the CSV slice index
    #[arg(long, value_name = "FILE", default_value = "outputs/logs/l3_index.csv")]
    pub logcsv: PathBuf,

    /// Path of the timestamped run log [default: outputs/logs/l3_run_<timestamp>.txt]
    #[arg(long, value_name = "FILE")]
    pub logtxt: Option<PathBuf>,

    /// Write sample montages of the extracted slices
    #[arg(long)]
    pub preview: bool,

    /// Window level in HU
    #[arg(long, default_value_t = 40.0, allow_negative_numbers = true)]
    pub window_level: f32,

    /// Window width in HU
    #[arg(long, default_value_t = 400.0)]
    pub window_width: f32,

    /// Lower edge of the lumbar band, as a fraction of the craniocaudal extent
    #[arg(long, default_value_t = 0.60)]
    pub low_frac: f64,

    /// Upper edge of the lumbar band, as a fraction of the craniocaudal extent
    #[arg(long, default_value_t = 0.75)]
    pub high_frac: f64,

    /// Minimum number of slices to keep per patient
    #[arg(long, default_value_t = 8)]
    pub min_slices: usize,

    /// Maximum number of slices to keep per patient
    #[arg(long, default_value_t = 20)]
    pub max_slices: usize,

    /// Minimum slice count for a CT series to qualify
    #[arg(long, default_value_t = 10)]
    pub min_series_slices: usize,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the run configuration from the parsed flags
    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig::default()
            .with_band(
                LumbarBand::default()
                    .with_fractions(self.low_frac, self.high_frac)
                    .with_limits(self.min_slices, self.max_slices),
            )
            .with_window(DisplayWindow::new(self.window_level, self.window_width))
            .with_min_series_slices(self.min_series_slices)
    }
}
