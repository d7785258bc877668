use crate::api::RunReport;
use std::fmt;
use std::path::Path;

/// Text summary of a finished run
pub struct TextReport<'a> {
    report: &'a RunReport,
    index_path: &'a Path,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(report: &'a RunReport, index_path: &'a Path) -> Self {
        Self { report, index_path }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "L3 Extraction Summary")?;
        writeln!(f, "=====================")?;
        writeln!(f)?;
        writeln!(f, "Patients:       {}", self.report.total())?;
        writeln!(f, "Succeeded:      {}", self.report.ok)?;
        writeln!(f, "Failed:         {}", self.report.failed)?;
        writeln!(f, "Slices saved:   {}", self.report.rows.len())?;
        writeln!(f, "Index:          {}", self.index_path.display())?;

        Ok(())
    }
}
