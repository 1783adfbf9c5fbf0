use std::io;

use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Upload exceeds {0} bytes")]
    LimitExceeded(u64),

    #[error("Upload stream interrupted: {0}")]
    Stream(io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::AlreadyExists(name) => ApplicationError::Conflict(name),
            StorageError::LimitExceeded(limit) => ApplicationError::SizeExceeded { limit },
            StorageError::Stream(e) | StorageError::Io(e) => {
                ApplicationError::UploadFailed(format!("Storage error: {}", e))
            }
        }
    }
}
