//! Error types for metaguide operations.

use thiserror::Error;

/// Errors that can occur while processing a document or container.
///
/// The transform itself never fails: malformed markup degrades to literal
/// text. Errors only arise at the container and filesystem boundaries.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid entry name: {0:?}")]
    InvalidEntryName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
