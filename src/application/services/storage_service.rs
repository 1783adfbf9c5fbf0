use std::path::PathBuf;

use async_trait::async_trait;
use axum::body::Bytes;
use futures::stream::BoxStream;

use crate::{application::error::ApplicationError, domain::models::project::ProjectId};

/// Upload payload as it arrives from the client.
pub type ChunkStream<'a> = BoxStream<'a, std::io::Result<Bytes>>;

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub size: u64,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Returns the directory holding a project's files, creating it if needed.
    async fn resolve_project_directory(
        &self,
        project_id: &ProjectId,
    ) -> Result<PathBuf, ApplicationError>;

    /// Writes `chunks` to a new file named `file_id` in the project directory.
    ///
    /// Fails with `Conflict` without reading the stream if the name is taken,
    /// and with `SizeExceeded` once more than `max_bytes` have arrived. Nothing
    /// is left on disk when the write does not complete.
    async fn write_file(
        &self,
        project_id: &ProjectId,
        file_id: &str,
        chunks: &mut ChunkStream<'_>,
        max_bytes: u64,
    ) -> Result<StoredFile, ApplicationError>;
}
