use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::{
    adapters::dto::data_dto::SignalResponse, application::error::ApplicationError,
    domain::models::signal::ResponseSignal,
};

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, signal) = match self {
            ApplicationError::TypeNotSupported(ref mime) => {
                warn!("Rejected upload with unsupported type '{}'", mime);
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    ResponseSignal::FileTypeNotSupported,
                )
            }
            ApplicationError::SizeExceeded { limit } => {
                warn!("Rejected upload larger than {} bytes", limit);
                (StatusCode::PAYLOAD_TOO_LARGE, ResponseSignal::FileSizeExceeded)
            }
            ApplicationError::InvalidProjectId(ref id) => {
                warn!("Rejected invalid project id {:?}", id);
                (StatusCode::BAD_REQUEST, ResponseSignal::ProjectIdInvalid)
            }
            ApplicationError::BadRequest(ref msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ResponseSignal::FileValidateFail)
            }
            ApplicationError::Conflict(ref msg) => {
                error!("Unresolved file name conflict: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ResponseSignal::FileUploadFailed,
                )
            }
            ApplicationError::UploadFailed(ref msg) => {
                error!("Error while uploading file: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ResponseSignal::FileUploadFailed,
                )
            }
        };

        (status, Json(SignalResponse { signal })).into_response()
    }
}
