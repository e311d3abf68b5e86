use std::{error::Error as StdError, fmt::Debug};

use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Storage provider error: {0}")]
    ProviderError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        ApplicationError::InternalError(format!("Storage error: {}", error))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(error.to_string()),
            std::io::ErrorKind::PermissionDenied => StorageError::Unauthorized(error.to_string()),
            _ => StorageError::InternalError(error.to_string()),
        }
    }
}

impl<E, R> From<SdkError<E, R>> for StorageError
where
    E: StdError + Send + Sync + 'static,
    R: Debug,
{
    fn from(error: SdkError<E, R>) -> Self {
        match error {
            SdkError::TimeoutError(_) => StorageError::NetworkError("Request timeout".to_string()),
            SdkError::DispatchFailure(_) => StorageError::NetworkError(format!(
                "Connection failed: {}",
                DisplayErrorContext(&error)
            )),
            _ => StorageError::ProviderError(DisplayErrorContext(&error).to_string()),
        }
    }
}
