use std::sync::Arc;

use thiserror::Error;
use zsync_metadata::ZsyncMetadataError;

#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum FileReconstructionError {
    #[error("Malformed Metadata: {0}")]
    MalformedMetadata(Arc<ZsyncMetadataError>),

    #[error("Malformed Plan: {0}")]
    MalformedPlan(String),

    #[error("Download Failed: bytes={start}-{end} (target length {length}): {reason}")]
    DownloadFailed {
        start: u64,
        end: u64,
        length: u64,
        status: Option<u16>,
        reason: String,
    },

    #[error("Integrity Mismatch: expected SHA-1 {expected}, got {actual}")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("Planner Failure: {0}")]
    PlannerFailure(String),

    #[error("IO Error: {0}")]
    IoError(Arc<std::io::Error>),

    #[error("Configuration Error: {0}")]
    ConfigurationError(String),
}

pub type Result<T> = std::result::Result<T, FileReconstructionError>;

impl From<std::io::Error> for FileReconstructionError {
    fn from(err: std::io::Error) -> Self {
        FileReconstructionError::IoError(Arc::new(err))
    }
}

impl From<ZsyncMetadataError> for FileReconstructionError {
    fn from(err: ZsyncMetadataError) -> Self {
        match err {
            // A descriptor that can't be read is an IO problem, not a malformed one.
            ZsyncMetadataError::IoError(e) => FileReconstructionError::IoError(Arc::new(e)),
            e => FileReconstructionError::MalformedMetadata(Arc::new(e)),
        }
    }
}

impl From<tempfile::PersistError> for FileReconstructionError {
    fn from(err: tempfile::PersistError) -> Self {
        FileReconstructionError::IoError(Arc::new(err.error))
    }
}
