//! Run outputs: slice index, run log and preview montages

pub mod index;
pub mod preview;
pub mod run_log;

pub use index::{write_index, IndexRow, INDEX_HEADER};
pub use preview::write_previews;
pub use run_log::RunLog;
