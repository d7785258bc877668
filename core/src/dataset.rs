//! Post-download dataset tally
//!
//! Counts patients and CT slice files of a downloaded collection and writes
//! a short text and JSON report next to the run logs.

use crate::error::Result;
use chrono::Local;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default collection name used in reports
pub const DEFAULT_DATASET_NAME: &str = "NSCLC-Radiomics";

/// Summary of a downloaded dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetReport {
    pub dataset_name: String,
    pub total_patients: usize,
    pub total_slices: usize,
    pub generated_on: String,
    pub data_path: String,
}

/// Tallies patient directories and `.dcm` files below `data_dir`
///
/// Every direct subdirectory is one patient; slice files are counted
/// anywhere in that patient's subtree. The extension match is case-sensitive,
/// so `.DCM` files are not counted here even though extraction reads them.
pub fn tally_dataset(data_dir: &Path, dataset_name: &str) -> Result<DatasetReport> {
    let mut total_patients = 0;
    let mut total_slices = 0;

    for entry in std::fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            total_patients += 1;
            total_slices += count_dcm_files(&path)?;
        }
    }

    let data_path = std::fs::canonicalize(data_dir).unwrap_or_else(|_| data_dir.to_path_buf());

    Ok(DatasetReport {
        dataset_name: dataset_name.to_string(),
        total_patients,
        total_slices,
        generated_on: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        data_path: data_path.display().to_string(),
    })
}

fn count_dcm_files(directory: &Path) -> std::io::Result<usize> {
    let mut count = 0;
    for entry in std::fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            count += count_dcm_files(&path)?;
        } else if path.extension().is_some_and(|ext| ext == "dcm") {
            count += 1;
        }
    }
    Ok(count)
}

/// Writes `dataset_report.txt` and `dataset_report.json` into `logs_dir`
///
/// # Returns
///
/// Paths of the text and JSON reports
pub fn write_dataset_report(report: &DatasetReport, logs_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(logs_dir)?;

    let txt_path = logs_dir.join("dataset_report.txt");
    std::fs::write(&txt_path, report.to_string())?;

    let json_path = logs_dir.join("dataset_report.json");
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| crate::L3Error::InvalidValue(e.to_string()))?;
    std::fs::write(&json_path, json)?;

    Ok((txt_path, json_path))
}

impl fmt::Display for DatasetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("Dataset Report - {}", self.dataset_name);
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "-".repeat(title.len()))?;
        writeln!(f, "Total Patients: {}", self.total_patients)?;
        writeln!(f, "Total CT Slices: {}", self.total_slices)?;
        writeln!(f, "Generated On: {}", self.generated_on)?;
        writeln!(f, "Data Path: {}", self.data_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn make_dataset() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let series = temp_dir.path().join("LUNG1-001").join("study").join("series");
        std::fs::create_dir_all(&series).unwrap();
        for i in 0..3 {
            File::create(series.join(format!("1-{:02}.dcm", i))).unwrap();
        }
        File::create(series.join("LICENSE")).unwrap();

        let other = temp_dir.path().join("LUNG1-002");
        std::fs::create_dir_all(&other).unwrap();
        File::create(other.join("1-01.DCM")).unwrap();

        File::create(temp_dir.path().join("manifest.tcia")).unwrap();
        temp_dir
    }

    #[test]
    fn test_tally_counts_patients_and_slices() {
        let dataset = make_dataset();
        let report = tally_dataset(dataset.path(), DEFAULT_DATASET_NAME).unwrap();

        assert_eq!(report.dataset_name, "NSCLC-Radiomics");
        assert_eq!(report.total_patients, 2);
        assert_eq!(report.total_slices, 3);
    }

    #[test]
    fn test_tally_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(tally_dataset(&temp_dir.path().join("absent"), "x").is_err());
    }

    #[test]
    fn test_write_reports() {
        let dataset = make_dataset();
        let logs = dataset.path().join("logs");
        let report = tally_dataset(dataset.path(), "Test").unwrap();

        let (txt, json) = write_dataset_report(&report, &logs).unwrap();

        let text = std::fs::read_to_string(txt).unwrap();
        assert!(text.starts_with("Dataset Report - Test\n"));
        assert!(text.contains("Total CT Slices: 3"));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(value["total_patients"], 2);
        assert_eq!(value["dataset_name"], "Test");
    }
}
