use chrono::{DateTime, Utc};

use crate::domain::models::project::ProjectId;

/// A file accepted and written to its project directory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_id: String,
    pub project_id: ProjectId,
    pub mime_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}
