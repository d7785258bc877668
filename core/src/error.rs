use std::path::PathBuf;
use thiserror::Error;

/// Result type for l3extract operations
pub type Result<T> = std::result::Result<T, L3Error>;

/// Error types for l3extract operations
#[derive(Error, Debug)]
pub enum L3Error {
    /// DICOM reading error
    #[error("DICOM error: {0}")]
    DicomError(String),

    /// Invalid tag value
    #[error("Invalid tag value: {0}")]
    InvalidValue(String),

    /// Pixel data could not be materialized for one slice
    #[error("Failed to decode pixel data of {path}: {message}")]
    DecodeError { path: PathBuf, message: String },

    /// Rejected run configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Output directory could not be created
    #[error("Cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Slice image could not be written
    #[error("Cannot write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Index file could not be written
    #[error("Cannot write index file: {0}")]
    IndexWrite(#[from] csv::Error),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl L3Error {
    /// Whether this error invalidates the whole run rather than one patient
    ///
    /// Resource-level failures (output directories, image and index writes)
    /// abort the run. Everything else is scoped to the patient being processed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            L3Error::OutputDir { .. } | L3Error::ImageWrite { .. } | L3Error::IndexWrite(_)
        )
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for L3Error {
    fn from(e: dicom_object::ReadError) -> Self {
        L3Error::DicomError(format!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_errors_are_fatal() {
        let err = L3Error::OutputDir {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn test_patient_errors_are_not_fatal() {
        assert!(!L3Error::DicomError("truncated".to_string()).is_fatal());
        assert!(!L3Error::DecodeError {
            path: PathBuf::from("a.dcm"),
            message: "unsupported transfer syntax".to_string(),
        }
        .is_fatal());
        assert!(!L3Error::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")).is_fatal());
    }
}
