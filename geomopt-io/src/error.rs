//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for geomopt_core::Error {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Io(io) => geomopt_core::Error::Io(io),
            other => geomopt_core::Error::InvalidData(other.to_string()),
        }
    }
}
