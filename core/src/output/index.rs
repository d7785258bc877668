use crate::error::Result;
use serde::Serialize;
use std::path::Path;

/// Column names of the slice index, in order
pub const INDEX_HEADER: [&str; 3] = ["PatientID", "SliceIndex", "SavedPath"];

/// One saved slice in the output index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexRow {
    #[serde(rename = "PatientID")]
    pub patient_id: String,

    #[serde(rename = "SliceIndex")]
    pub slice_index: usize,

    /// Saved PNG path with forward slashes
    #[serde(rename = "SavedPath")]
    pub saved_path: String,
}

impl IndexRow {
    /// Creates a row, normalizing path separators to `/`
    pub fn new(patient_id: &str, slice_index: usize, saved_path: &Path) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            slice_index,
            saved_path: saved_path.to_string_lossy().replace('\\', "/"),
        }
    }
}

/// Writes the slice index as CSV, header included even when empty
///
/// Parent directories are created as needed. An existing file is replaced.
///
/// # Errors
///
/// Returns [`crate::L3Error::IndexWrite`] or an I/O error; both abort the run
pub fn write_index(path: &Path, rows: &[IndexRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(INDEX_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
