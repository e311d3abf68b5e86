use thiserror::Error;

use crate::{application::services::archive::ArchiveError, services::StorageError};

#[derive(Debug)]
pub enum ApplicationError {
    MissingField(String),
    InvalidArchive { reason: String, details: Option<String> },
    NoMatchingFiles,
    BadRequest(String),
    PayloadTooLarge,
    InternalError(String),
}

impl From<ArchiveError> for ApplicationError {
    fn from(error: ArchiveError) -> Self {
        match error {
            ArchiveError::Corrupt(details) => ApplicationError::InvalidArchive {
                reason: "Invalid ZIP file".to_string(),
                details: Some(details),
            },
            ArchiveError::Empty => ApplicationError::InvalidArchive {
                reason: "ZIP file is empty".to_string(),
                details: None,
            },
            ArchiveError::NoSvgFiles => ApplicationError::NoMatchingFiles,
        }
    }
}

/// Both backends refused a file.
#[derive(Debug, Error)]
#[error("Failed both cloud and local: {cloud}, local: {local}")]
pub struct BackendWriteFailure {
    pub cloud: StorageError,
    pub local: StorageError,
}
