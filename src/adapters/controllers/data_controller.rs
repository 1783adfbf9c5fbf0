use std::{io, sync::Arc};

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use futures::{StreamExt, TryStreamExt};
use tracing::{info, warn};

use crate::{
    adapters::dto::data_dto::UploadFileResponse,
    application::{error::ApplicationError, services::UploadService},
    domain::models::project::ProjectId,
};

const FILE_FIELD: &str = "file";
const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Headroom above the file cap for multipart boundaries and part headers.
pub const MULTIPART_FRAMING_ALLOWANCE: u64 = 64 * 1024;

pub struct DataController;

impl DataController {
    /// POST /api/v1/data/upload/{project_id}
    /// Multipart body with the payload in a `file` field.
    pub async fn upload_file(
        State(upload_service): State<Arc<UploadService>>,
        Path(project_id): Path<String>,
        headers: HeaderMap,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Json<UploadFileResponse>, ApplicationError> {
        let project_id = ProjectId::try_from(project_id)?;

        let max_bytes = upload_service.validator().max_size_bytes();
        let mut multipart = multipart.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return ApplicationError::SizeExceeded { limit: max_bytes };
            }
            ApplicationError::BadRequest(format!("Invalid multipart request: {}", e))
        })?;

        // Parts carry no size of their own. Minus the framing allowance the
        // request length only exceeds the cap for bodies the route limit
        // would refuse anyway; the storage cap enforces the exact limit.
        let declared_size = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map_or(0, |len| len.saturating_sub(MULTIPART_FRAMING_ALLOWANCE));

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                return ApplicationError::SizeExceeded { limit: max_bytes };
            }
            warn!("Invalid multipart data: {}", e);
            ApplicationError::BadRequest("Invalid request format".to_string())
        })? {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let file_name = field
                .file_name()
                .map(str::to_owned)
                .ok_or_else(|| ApplicationError::BadRequest("Missing file name".to_string()))?;
            let mime_type = field
                .content_type()
                .unwrap_or(DEFAULT_MIME_TYPE)
                .to_owned();

            let chunks = field.map_err(io::Error::other).boxed();
            let uploaded = upload_service
                .handle_upload(&project_id, chunks, &mime_type, declared_size, &file_name)
                .await?;

            info!(
                "Uploaded '{}' as {} ({}, {} bytes) to project {} at {}",
                file_name,
                uploaded.file_id,
                uploaded.mime_type,
                uploaded.size,
                uploaded.project_id,
                uploaded.uploaded_at.to_rfc3339()
            );

            return Ok(Json(UploadFileResponse::from(uploaded)));
        }

        Err(ApplicationError::BadRequest(
            "Missing required 'file' field".to_string(),
        ))
    }
}
