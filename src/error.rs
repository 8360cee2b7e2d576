//! Error types for speedread operations.

use thiserror::Error;

/// Errors that can occur while rewriting a book.
///
/// Problems confined to a single content document (missing body, unusual
/// markup, an unreadable payload) are not errors: the entry is copied
/// through untouched and the condition is logged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    #[error("Unsupported archive: {0}")]
    UnsupportedArchive(String),

    #[error("Entry too large: {0}")]
    EntryTooLarge(String),

    #[error("Unsupported mode: {0:?} (expected \"syllable\" or \"bionic\")")]
    UnsupportedMode(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::InvalidArchive(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
