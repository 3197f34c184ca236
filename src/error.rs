//! Error types for bionic-epub operations.

use thiserror::Error;

use crate::transform::TransformError;

/// Errors that can occur while converting a book.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid container: {0}")]
    ContainerFormat(#[from] zip::result::ZipError),

    #[error("Failed to transform {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: TransformError,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Conversion cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
