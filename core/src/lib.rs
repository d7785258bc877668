pub mod api;
pub mod cli;
pub mod dataset;
pub mod error;
pub mod extraction;
pub mod imaging;
pub mod output;
pub mod selection;
pub mod types;

pub use api::{PatientExtraction, PatientOutcome, RunReport, SkipReason, SliceExtractor};
pub use cli::report::TextReport;
pub use error::{L3Error, Result};
pub use extraction::ImageRecord;
pub use output::{write_index, write_previews, IndexRow, RunLog};
pub use selection::{select_lumbar_indices, select_primary_series, sort_stack, SeriesGroup};
pub use types::*;
