pub mod storage_service;
pub mod upload_service;
pub mod upload_validator;

pub use storage_service::{ChunkStream, StorageService, StoredFile};
pub use upload_service::UploadService;
pub use upload_validator::UploadValidator;
