use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::{
    application::{
        error::ApplicationError,
        services::{
            storage_service::{ChunkStream, StorageService},
            upload_validator::{generate_file_id, sanitize_file_name, UploadValidator},
        },
    },
    domain::models::{file::UploadedFile, project::ProjectId},
};

/// Fresh tokens drawn when a generated name already exists on disk.
const MAX_NAME_ATTEMPTS: usize = 5;

pub struct UploadService {
    validator: UploadValidator,
    storage: Arc<dyn StorageService>,
}

impl UploadService {
    pub fn new(validator: UploadValidator, storage: Arc<dyn StorageService>) -> Self {
        Self { validator, storage }
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    pub async fn handle_upload(
        &self,
        project_id: &ProjectId,
        mut chunks: ChunkStream<'_>,
        declared_mime_type: &str,
        declared_size_bytes: u64,
        original_file_name: &str,
    ) -> Result<UploadedFile, ApplicationError> {
        // Validation happens before any directory is created.
        let mut file_id = self.validator.validate_and_name(
            declared_mime_type,
            declared_size_bytes,
            original_file_name,
        )?;

        self.storage.resolve_project_directory(project_id).await?;

        let max_bytes = self.validator.max_size_bytes();
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            match self
                .storage
                .write_file(project_id, &file_id, &mut chunks, max_bytes)
                .await
            {
                Ok(stored) => {
                    info!(
                        "Stored {} ({} bytes) for project {}",
                        file_id, stored.size, project_id
                    );
                    return Ok(UploadedFile {
                        file_id,
                        project_id: project_id.clone(),
                        mime_type: declared_mime_type.to_string(),
                        size: stored.size,
                        uploaded_at: Utc::now(),
                    });
                }
                Err(ApplicationError::Conflict(msg)) => {
                    warn!("Generated name collision on attempt {}: {}", attempt, msg);
                    file_id = generate_file_id(&sanitize_file_name(original_file_name));
                }
                Err(e) => return Err(e),
            }
        }

        Err(ApplicationError::UploadFailed(format!(
            "no free file name after {} attempts",
            MAX_NAME_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        path::PathBuf,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use axum::body::Bytes;
    use futures::{stream, StreamExt};

    use super::*;
    use crate::{
        application::services::storage_service::StoredFile, services::LocalStorageService,
    };

    fn validator() -> UploadValidator {
        let types = ["text/plain", "application/pdf"]
            .into_iter()
            .map(String::from)
            .collect();
        UploadValidator::new(types, 1)
    }

    fn body(content: &'static [u8]) -> ChunkStream<'static> {
        stream::iter(vec![Ok(Bytes::from_static(content))]).boxed()
    }

    fn project() -> ProjectId {
        ProjectId::try_from("proj-1").unwrap()
    }

    /// Reports a name collision for the first `collisions` writes.
    struct CollidingStorage {
        collisions: usize,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl StorageService for CollidingStorage {
        async fn resolve_project_directory(
            &self,
            project_id: &ProjectId,
        ) -> Result<PathBuf, ApplicationError> {
            Ok(PathBuf::from(project_id.as_str()))
        }

        async fn write_file(
            &self,
            _project_id: &ProjectId,
            file_id: &str,
            chunks: &mut ChunkStream<'_>,
            _max_bytes: u64,
        ) -> Result<StoredFile, ApplicationError> {
            if self.writes.fetch_add(1, Ordering::SeqCst) < self.collisions {
                return Err(ApplicationError::Conflict(file_id.to_string()));
            }
            let mut size = 0;
            while let Some(chunk) = chunks.next().await {
                size += chunk.unwrap().len() as u64;
            }
            Ok(StoredFile {
                path: PathBuf::from(file_id),
                size,
            })
        }
    }

    #[tokio::test]
    async fn rejected_type_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files_dir = dir.path().join("files");
        let service = UploadService::new(
            validator(),
            Arc::new(LocalStorageService::new(files_dir.clone(), 1024)),
        );

        let err = service
            .handle_upload(&project(), body(b"png"), "image/png", 3, "a.png")
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::TypeNotSupported(_)));
        assert!(!files_dir.exists());
    }

    #[tokio::test]
    async fn oversized_declaration_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let files_dir = dir.path().join("files");
        let service = UploadService::new(
            validator(),
            Arc::new(LocalStorageService::new(files_dir.clone(), 1024)),
        );

        let err = service
            .handle_upload(&project(), body(b"x"), "text/plain", 2 * 1_048_576, "a.txt")
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::SizeExceeded { .. }));
        assert!(!files_dir.exists());
    }

    #[tokio::test]
    async fn identical_names_are_stored_separately() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(
            validator(),
            Arc::new(LocalStorageService::new(dir.path().to_path_buf(), 1024)),
        );

        let first = service
            .handle_upload(&project(), body(b"first"), "text/plain", 5, "same.txt")
            .await
            .unwrap();
        let second = service
            .handle_upload(&project(), body(b"second"), "text/plain", 6, "same.txt")
            .await
            .unwrap();

        assert_ne!(first.file_id, second.file_id);
        let project_dir = dir.path().join("proj-1");
        assert_eq!(std::fs::read(project_dir.join(&first.file_id)).unwrap(), b"first");
        assert_eq!(std::fs::read(project_dir.join(&second.file_id)).unwrap(), b"second");
    }

    #[tokio::test]
    async fn reports_written_size_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let service = UploadService::new(
            validator(),
            Arc::new(LocalStorageService::new(dir.path().to_path_buf(), 2)),
        );

        let uploaded = service
            .handle_upload(&project(), body(b"hello"), "text/plain", 0, "hi.txt")
            .await
            .unwrap();

        assert_eq!(uploaded.size, 5);
        assert_eq!(uploaded.project_id, project());
        assert_eq!(uploaded.mime_type, "text/plain");
        assert!(uploaded.file_id.ends_with("_hi.txt"));
    }

    #[tokio::test]
    async fn retries_with_a_new_name_on_collision() {
        let storage = Arc::new(CollidingStorage {
            collisions: 2,
            writes: AtomicUsize::new(0),
        });
        let service = UploadService::new(validator(), storage.clone());

        let uploaded = service
            .handle_upload(&project(), body(b"data"), "text/plain", 4, "a.txt")
            .await
            .unwrap();

        assert_eq!(storage.writes.load(Ordering::SeqCst), 3);
        assert_eq!(uploaded.size, 4);
        assert!(uploaded.file_id.ends_with("_a.txt"));
    }

    #[tokio::test]
    async fn gives_up_after_repeated_collisions() {
        let storage = Arc::new(CollidingStorage {
            collisions: usize::MAX,
            writes: AtomicUsize::new(0),
        });
        let service = UploadService::new(validator(), storage.clone());

        let err = service
            .handle_upload(&project(), body(b"data"), "text/plain", 4, "a.txt")
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::UploadFailed(_)));
        assert_eq!(storage.writes.load(Ordering::SeqCst), MAX_NAME_ATTEMPTS);
    }
}
