use file_reconstruction::FileReconstructionError;
use thiserror::Error;
use zsync_metadata::ZsyncMetadataError;

#[derive(Error, Debug)]
pub enum ZsyncClientError {
    #[error("Could not fetch metadata from {location}: {reason}")]
    MetadataFetch { location: String, reason: String },

    #[error(transparent)]
    Reconstruction(#[from] FileReconstructionError),

    #[error("I/O error: {0}")]
    IOError(#[from] std::io::Error),
}

impl ZsyncClientError {
    pub fn is_integrity_mismatch(&self) -> bool {
        matches!(self, Self::Reconstruction(FileReconstructionError::IntegrityMismatch { .. }))
    }
}

impl From<ZsyncMetadataError> for ZsyncClientError {
    fn from(err: ZsyncMetadataError) -> Self {
        Self::Reconstruction(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ZsyncClientError>;
