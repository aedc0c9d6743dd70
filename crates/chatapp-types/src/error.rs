use std::io;

use thiserror::Error;

/// Failures reading or writing local JSON fixture files.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found")]
    NotFound,

    #[error("Bad data in reading/writing file")]
    BadData,

    #[error("Empty data in reading/writing file")]
    EmptyData,

    #[error("File reading error: {0}")]
    Reading(#[source] io::Error),

    #[error("File writing error: {0}")]
    Write(#[source] io::Error),
}
