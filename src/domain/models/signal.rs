use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResponseSignal {
    #[serde(rename = "file uploaded successfully")]
    FileUploadSuccess,
    #[serde(rename = "file upload failed")]
    FileUploadFailed,
    #[serde(rename = "file type not supported")]
    FileTypeNotSupported,
    #[serde(rename = "file size exceeded")]
    FileSizeExceeded,
    #[serde(rename = "file validation failed")]
    FileValidateFail,
    #[serde(rename = "project id invalid")]
    ProjectIdInvalid,
}

impl ResponseSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSignal::FileUploadSuccess => "file uploaded successfully",
            ResponseSignal::FileUploadFailed => "file upload failed",
            ResponseSignal::FileTypeNotSupported => "file type not supported",
            ResponseSignal::FileSizeExceeded => "file size exceeded",
            ResponseSignal::FileValidateFail => "file validation failed",
            ResponseSignal::ProjectIdInvalid => "project id invalid",
        }
    }
}
