use axum::extract::FromRef;
use std::sync::Arc;

use crate::{
    adapters::datastore::Datastore,
    application::services::{StorageService, UploadService, UploadValidator},
    domain::config::settings::Settings,
    services::LocalStorageService,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub upload_service: Arc<UploadService>,
    pub datastore: Datastore,
}

impl AppState {
    pub fn new(settings: Settings, datastore: Datastore) -> Self {
        let storage = Arc::new(LocalStorageService::new(
            settings.files_dir.clone(),
            settings.file_default_chunk_size,
        )) as Arc<dyn StorageService>;
        let upload_service = UploadService::new(UploadValidator::from_settings(&settings), storage);

        Self {
            settings: Arc::new(settings),
            upload_service: Arc::new(upload_service),
            datastore,
        }
    }
}
