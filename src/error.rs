//! Error types for the logbook maker library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the logbook maker library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing user-supplied parameter
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Input file not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Document has no pages
    #[error("PDF has no pages")]
    EmptyDocument,

    /// Encrypted input is not supported
    #[error("PDF is encrypted: {}", .0.display())]
    Encrypted(PathBuf),

    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Temporary output could not be moved into place
    #[error("Could not write {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Broad error category, used to pick the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Document,
    Io,
}

impl Error {
    /// Shorthand for building a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::FileNotFound(_)
            | Error::EmptyDocument
            | Error::Encrypted(_)
            | Error::Pdf(_) => ErrorKind::Document,
            Error::Io(_) | Error::Persist { .. } => ErrorKind::Io,
        }
    }
}
