use thiserror::Error;

/// doctrack error types
#[derive(Error, Debug)]
pub enum DoctrackError {
    /// Payload is not the expected JSON shape, or a field failed to parse
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid command-line or environment configuration
    #[error("config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DoctrackError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            DoctrackError::Io(err.into())
        } else {
            DoctrackError::Parse(err.to_string())
        }
    }
}

impl From<simd_json::Error> for DoctrackError {
    fn from(err: simd_json::Error) -> Self {
        DoctrackError::Parse(err.to_string())
    }
}

/// Result type alias for doctrack
pub type Result<T> = std::result::Result<T, DoctrackError>;
