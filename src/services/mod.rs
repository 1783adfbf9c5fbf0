mod error;
mod local_storage;

pub use error::StorageError;
pub use local_storage::LocalStorageService;
