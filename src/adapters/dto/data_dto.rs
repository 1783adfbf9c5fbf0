use serde::Serialize;

use crate::domain::models::{file::UploadedFile, signal::ResponseSignal};

#[derive(Debug, Serialize)]
pub struct SignalResponse {
    pub signal: ResponseSignal,
}

#[derive(Debug, Serialize)]
pub struct UploadFileResponse {
    pub signal: ResponseSignal,
    pub file_id: String,
}

impl From<UploadedFile> for UploadFileResponse {
    fn from(file: UploadedFile) -> Self {
        Self {
            signal: ResponseSignal::FileUploadSuccess,
            file_id: file.file_id,
        }
    }
}
