use crate::error::{L3Error, Result};
use crate::extraction::{collect_dicom_files, ImageRecord};
use crate::imaging::{save_png, to_hu, window};
use crate::output::{IndexRow, RunLog};
use crate::selection::{select_lumbar_indices, select_primary_series, sort_stack};
use crate::types::ExtractConfig;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

/// Main extractor for L3 slices
///
/// Walks a dataset root holding one directory per patient and, for each
/// patient, picks the primary CT series, selects the L3 band and saves the
/// windowed slices as PNGs under `<output>/<patient_id>/`.
///
/// Patients are processed one at a time in directory-name order. A failing
/// patient never stops the run; only resource errors (see
/// [`L3Error::is_fatal`]) do.
///
/// # Example
///
/// ```no_run
/// use l3extract_core::{ExtractConfig, RunLog, SliceExtractor};
/// use std::path::Path;
///
/// let extractor = SliceExtractor::new(ExtractConfig::default(), "outputs/l3_slices");
/// let mut run_log = RunLog::console_only();
/// let report = extractor.run(Path::new("data/raw"), &mut run_log).unwrap();
/// println!("{} ok, {} failed", report.ok, report.failed);
/// ```
#[derive(Debug, Clone)]
pub struct SliceExtractor {
    config: ExtractConfig,
    output_root: PathBuf,
    show_progress: bool,
}

impl SliceExtractor {
    /// Creates an extractor writing under `output_root`
    pub fn new(config: ExtractConfig, output_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_root: output_root.into(),
            show_progress: false,
        }
    }

    /// Builder: Show a console progress bar during [`SliceExtractor::run`]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Processes every patient directory under `input_root`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, `input_root` cannot
    /// be listed or a patient hits a fatal resource error. Patient-scoped
    /// failures are counted instead.
    pub fn run(&self, input_root: &Path, run_log: &mut RunLog) -> Result<RunReport> {
        self.config.validate()?;
        let patients = list_patient_dirs(input_root)?;
        run_log.info(&format!(
            "Found {} patient directories in {}",
            patients.len(),
            input_root.display()
        ));

        let progress = if self.show_progress {
            let bar = ProgressBar::new(patients.len() as u64);
            if let Ok(style) =
                ProgressStyle::with_template("{msg:>12} [{bar:40}] {pos}/{len} patients")
            {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        } else {
            ProgressBar::hidden()
        };

        let mut report = RunReport::default();
        for (patient_id, patient_dir) in patients {
            progress.set_message(patient_id.clone());
            match self.process_patient(&patient_id, &patient_dir, run_log) {
                Ok(PatientOutcome::Extracted(extraction)) => {
                    run_log.info(&format!(
                        "[{}] saved {} slices from series {} ({} in stack)",
                        patient_id,
                        extraction.rows.len(),
                        extraction.series_uid,
                        extraction.stack_len
                    ));
                    report.record_success(extraction.rows);
                }
                Ok(PatientOutcome::Skipped(reason)) => {
                    run_log.warn(&format!("[{}] skipped: {}", patient_id, reason));
                    report.record_failure();
                }
                Err(e) if e.is_fatal() => {
                    progress.abandon();
                    run_log.error(&format!("[{}] aborting run: {}", patient_id, e));
                    return Err(e);
                }
                Err(e) => {
                    run_log.error(&format!("[{}] failed: {}", patient_id, e));
                    report.record_failure();
                }
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(report)
    }

    /// Runs the full pipeline for one patient directory
    ///
    /// Each stage that comes up empty ends the patient with a
    /// [`PatientOutcome::Skipped`] reason. No output directory is created
    /// before the first slice is actually written.
    pub fn process_patient(
        &self,
        patient_id: &str,
        patient_dir: &Path,
        run_log: &mut RunLog,
    ) -> Result<PatientOutcome> {
        let files = collect_dicom_files(patient_dir)?;
        if files.is_empty() {
            return Ok(PatientOutcome::Skipped(SkipReason::NoDicomFiles));
        }

        let mut records = Vec::with_capacity(files.len());
        let mut skipped_files = 0;
        for path in files {
            match ImageRecord::from_file(path.clone()) {
                Ok(record) => records.push(record),
                Err(e) => {
                    debug!("Skipping {}: {}", path.display(), e);
                    skipped_files += 1;
                }
            }
        }
        if skipped_files > 0 {
            run_log.warn(&format!(
                "[{}] {} unreadable files skipped",
                patient_id, skipped_files
            ));
        }

        let series = match select_primary_series(records, self.config.min_series_slices) {
            Some(series) => series,
            None => return Ok(PatientOutcome::Skipped(SkipReason::NoPrimarySeries)),
        };
        let series_uid = series.series_uid;
        let stack = sort_stack(series.records);

        let indices = select_lumbar_indices(&stack, &self.config.band);
        if indices.is_empty() {
            return Ok(PatientOutcome::Skipped(SkipReason::EmptySelection));
        }
        debug!("[{}] selected stack positions {:?}", patient_id, indices);

        let out_dir = self.output_root.join(patient_id);
        let mut rows = Vec::with_capacity(indices.len());
        let mut dropped_slices = 0;
        for idx in indices {
            let record = &stack[idx];
            let pixels = match record.pixels() {
                Ok(pixels) => pixels,
                Err(e) => {
                    run_log.warn(&format!("[{}] dropping slice {}: {}", patient_id, idx, e));
                    dropped_slices += 1;
                    continue;
                }
            };

            let img = window(&to_hu(&pixels, record.rescale), self.config.window);
            if rows.is_empty() {
                std::fs::create_dir_all(&out_dir).map_err(|source| L3Error::OutputDir {
                    path: out_dir.clone(),
                    source,
                })?;
            }
            let path = out_dir.join(format!("{:04}.png", idx));
            save_png(&img, &path)?;
            rows.push(IndexRow::new(patient_id, idx, &path));
        }

        if rows.is_empty() {
            return Ok(PatientOutcome::Skipped(SkipReason::NoSlicesSaved));
        }

        Ok(PatientOutcome::Extracted(PatientExtraction {
            series_uid,
            stack_len: stack.len(),
            rows,
            skipped_files,
            dropped_slices,
        }))
    }
}

/// Lists patient directories under a dataset root, sorted by name
pub fn list_patient_dirs(input_root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut patients = Vec::new();
    for entry in std::fs::read_dir(input_root)? {
        let path = entry?.path();
        if path.is_dir() {
            if let Some(name) = path.file_name() {
                patients.push((name.to_string_lossy().into_owned(), path));
            }
        }
    }
    patients.sort();
    Ok(patients)
}

/// Why a patient produced no slices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No DICOM candidate files in the patient's subtree
    NoDicomFiles,
    /// No CT series with enough slices
    NoPrimarySeries,
    /// The L3 heuristic selected nothing
    EmptySelection,
    /// Every selected slice failed to decode
    NoSlicesSaved,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::NoDicomFiles => "no DICOM files found",
            SkipReason::NoPrimarySeries => "no qualifying CT series",
            SkipReason::EmptySelection => "no slices selected in lumbar band",
            SkipReason::NoSlicesSaved => "no slices saved",
        };
        write!(f, "{}", reason)
    }
}

/// Result of one patient's pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PatientOutcome {
    Extracted(PatientExtraction),
    Skipped(SkipReason),
}

/// Slices saved for one patient
#[derive(Debug, Clone, PartialEq)]
pub struct PatientExtraction {
    /// Series the slices were taken from
    pub series_uid: String,

    /// Number of slices in the sorted stack
    pub stack_len: usize,

    /// One row per saved slice
    pub rows: Vec<IndexRow>,

    /// Files that could not be parsed
    pub skipped_files: usize,

    /// Selected slices whose pixels failed to decode
    pub dropped_slices: usize,
}

/// Aggregate outcome of a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Patients with at least one saved slice
    pub ok: usize,

    /// Patients skipped or failed
    pub failed: usize,

    /// Every saved slice, in processing order
    pub rows: Vec<IndexRow>,
}

impl RunReport {
    pub fn record_success(&mut self, rows: Vec<IndexRow>) {
        self.ok += 1;
        self.rows.extend(rows);
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Total patients visited
    pub fn total(&self) -> usize {
        self.ok + self.failed
    }
}
