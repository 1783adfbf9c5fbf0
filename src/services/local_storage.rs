use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
};
use tracing::{error, warn};

use crate::{
    application::{
        error::ApplicationError,
        services::storage_service::{ChunkStream, StorageService, StoredFile},
    },
    domain::models::project::ProjectId,
    services::error::StorageError,
};

/// Stores uploads on the local filesystem, one directory per project under
/// `files_dir`.
pub struct LocalStorageService {
    files_dir: PathBuf,
    chunk_size: usize,
}

impl LocalStorageService {
    pub fn new(files_dir: PathBuf, chunk_size: usize) -> Self {
        Self {
            files_dir,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn project_path(&self, project_id: &ProjectId) -> PathBuf {
        self.files_dir.join(project_id.as_str())
    }

    async fn copy_chunks(
        &self,
        file: &mut fs::File,
        chunks: &mut ChunkStream<'_>,
        max_bytes: u64,
    ) -> Result<u64, StorageError> {
        let mut written: u64 = 0;
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(StorageError::Stream)?;
            for piece in chunk.chunks(self.chunk_size) {
                written += piece.len() as u64;
                if written > max_bytes {
                    return Err(StorageError::LimitExceeded(max_bytes));
                }
                file.write_all(piece).await?;
            }
        }
        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn resolve_project_directory(
        &self,
        project_id: &ProjectId,
    ) -> Result<PathBuf, ApplicationError> {
        let path = self.project_path(project_id);
        fs::create_dir_all(&path).await.map_err(|e| {
            error!("Cannot create project directory {}: {}", path.display(), e);
            StorageError::Io(e)
        })?;
        Ok(path)
    }

    async fn write_file(
        &self,
        project_id: &ProjectId,
        file_id: &str,
        chunks: &mut ChunkStream<'_>,
        max_bytes: u64,
    ) -> Result<StoredFile, ApplicationError> {
        let path = self.project_path(project_id).join(file_id);

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(file_id.to_string()).into());
            }
            Err(e) => {
                error!("Cannot create {}: {}", path.display(), e);
                return Err(StorageError::Io(e).into());
            }
        };

        // Only covers cancellation; errors below clean up asynchronously.
        let mut guard = PartialFileGuard::new(&path);

        let result = self.copy_chunks(&mut file, chunks, max_bytes).await;
        drop(file);
        match result {
            Ok(size) => {
                guard.disarm();
                Ok(StoredFile { path, size })
            }
            Err(e) => {
                warn!("Discarding partial upload {}: {}", path.display(), e);
                if let Err(remove_err) = fs::remove_file(&path).await {
                    if remove_err.kind() != ErrorKind::NotFound {
                        error!("Cannot remove partial file {}: {}", path.display(), remove_err);
                    }
                }
                guard.disarm();
                Err(e.into())
            }
        }
    }
}

/// Removes an incomplete upload unless disarmed. Runs from `Drop` when the
/// request future is cancelled, so the removal there is blocking.
struct PartialFileGuard {
    path: Option<PathBuf>,
}

impl PartialFileGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    fn disarm(&mut self) {
        self.path = None;
    }
}

impl Drop for PartialFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != ErrorKind::NotFound {
                    error!("Cannot remove partial file {}: {}", path.display(), e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io, time::Duration};

    use axum::body::Bytes;
    use futures::stream;

    use super::*;

    fn project() -> ProjectId {
        ProjectId::try_from("proj-1").unwrap()
    }

    fn chunks(parts: Vec<io::Result<Bytes>>) -> ChunkStream<'static> {
        stream::iter(parts).boxed()
    }

    #[tokio::test]
    async fn resolving_a_project_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(dir.path().join("assets/files"), 16);

        let first = storage.resolve_project_directory(&project()).await.unwrap();
        let second = storage.resolve_project_directory(&project()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, dir.path().join("assets/files/proj-1"));
        assert!(first.is_dir());
    }

    #[tokio::test]
    async fn written_file_matches_input() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(dir.path().to_path_buf(), 3);
        storage.resolve_project_directory(&project()).await.unwrap();

        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let mut body = chunks(vec![
            Ok(Bytes::copy_from_slice(&payload[..4_000])),
            Ok(Bytes::copy_from_slice(&payload[4_000..])),
        ]);

        let stored = storage
            .write_file(&project(), "tok_data.bin", &mut body, 10_000)
            .await
            .unwrap();

        assert_eq!(stored.size, 10_000);
        assert_eq!(stored.path, dir.path().join("proj-1/tok_data.bin"));
        assert_eq!(std::fs::read(&stored.path).unwrap(), payload);
    }

    #[tokio::test]
    async fn existing_name_is_a_conflict_and_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(dir.path().to_path_buf(), 16);
        let project_dir = storage.resolve_project_directory(&project()).await.unwrap();
        std::fs::write(project_dir.join("tok_a.txt"), b"original").unwrap();

        let mut body = chunks(vec![Ok(Bytes::from_static(b"replacement"))]);
        let err = storage
            .write_file(&project(), "tok_a.txt", &mut body, 1024)
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Conflict(_)));
        assert_eq!(std::fs::read(project_dir.join("tok_a.txt")).unwrap(), b"original");
    }

    #[tokio::test]
    async fn exceeding_the_cap_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(dir.path().to_path_buf(), 4);
        let project_dir = storage.resolve_project_directory(&project()).await.unwrap();

        let mut body = chunks(vec![
            Ok(Bytes::from_static(b"0123456789")),
            Ok(Bytes::from_static(b"0123456789")),
        ]);
        let err = storage
            .write_file(&project(), "tok_big.txt", &mut body, 15)
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::SizeExceeded { limit: 15 }));
        assert!(!project_dir.join("tok_big.txt").exists());
    }

    #[tokio::test]
    async fn interrupted_stream_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(dir.path().to_path_buf(), 4);
        let project_dir = storage.resolve_project_directory(&project()).await.unwrap();

        let mut body = chunks(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "client went away")),
        ]);
        let err = storage
            .write_file(&project(), "tok_cut.txt", &mut body, 1024)
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::UploadFailed(_)));
        assert!(!project_dir.join("tok_cut.txt").exists());
    }

    #[tokio::test]
    async fn cancelled_write_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(dir.path().to_path_buf(), 4);
        let project_dir = storage.resolve_project_directory(&project()).await.unwrap();

        // First chunk arrives, then the client stalls forever.
        let mut body = stream::iter(vec![Ok(Bytes::from_static(b"partial"))])
            .chain(stream::pending())
            .boxed();
        let project = project();
        let write = storage.write_file(&project, "tok_stall.txt", &mut body, 1024);
        let outcome = tokio::time::timeout(Duration::from_millis(100), write).await;

        assert!(outcome.is_err());
        assert!(!project_dir.join("tok_stall.txt").exists());
    }

    #[tokio::test]
    async fn missing_project_directory_fails_the_upload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorageService::new(dir.path().to_path_buf(), 4);

        let mut body = chunks(vec![Ok(Bytes::from_static(b"data"))]);
        let err = storage
            .write_file(&project(), "tok_a.txt", &mut body, 1024)
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::UploadFailed(_)));
    }
}
