use thiserror::Error;

/// Everything that can be wrong with a zsync metadata descriptor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ZsyncMetadataError {
    #[error("Header section has no blank-line terminator before end of stream")]
    MissingTerminator,

    #[error("Malformed header line {line_number}: {line:?}")]
    MalformedLine { line_number: usize, line: String },

    #[error("Header {key} is not a non-negative integer: {value:?}")]
    InvalidInteger { key: String, value: String },

    #[error("Required header {0} is missing")]
    MissingField(&'static str),

    #[error("SHA-1 digest is not 40 hex characters: {0:?}")]
    InvalidDigest(String),

    #[error("Invalid MTime {0:?}")]
    InvalidMTime(String),

    #[error("Unsupported zsync stream version {0}")]
    UnsupportedVersion(String),

    #[error("Invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ZsyncMetadataError>;
