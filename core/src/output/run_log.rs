use crate::error::Result;
use chrono::Local;
use log::Level;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Timestamped plain-text log of one run
///
/// Every event goes to the `log` facade and, when a file is attached, is
/// appended as `[YYYY-mm-dd HH:MM:SS] LEVEL message` and flushed right away so
/// the log survives a crash mid-run.
#[derive(Debug, Default)]
pub struct RunLog {
    file: Option<File>,
}

impl RunLog {
    /// Creates the log file, replacing any previous content
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            file: Some(File::create(path)?),
        })
    }

    /// A run log that only forwards to the `log` facade
    pub fn console_only() -> Self {
        Self { file: None }
    }

    pub fn info(&mut self, message: &str) {
        self.event(Level::Info, message);
    }

    pub fn warn(&mut self, message: &str) {
        self.event(Level::Warn, message);
    }

    pub fn error(&mut self, message: &str) {
        self.event(Level::Error, message);
    }

    fn event(&mut self, level: Level, message: &str) {
        log::log!(level, "{}", message);

        if let Some(file) = self.file.as_mut() {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            let written = writeln!(file, "[{}] {} {}", timestamp, level, message)
                .and_then(|_| file.flush());
            if let Err(e) = written {
                log::warn!("Run log write failed, detaching file: {}", e);
                self.file = None;
            }
        }
    }
}
