use crate::domain::models::project::InvalidProjectId;

#[derive(Debug)]
pub enum ApplicationError {
    TypeNotSupported(String),
    SizeExceeded { limit: u64 },
    InvalidProjectId(String),
    BadRequest(String),
    Conflict(String),
    UploadFailed(String),
}

impl From<InvalidProjectId> for ApplicationError {
    fn from(error: InvalidProjectId) -> Self {
        ApplicationError::InvalidProjectId(error.0)
    }
}
