use std::sync::Arc;

use axum::{extract::State, Json};

use crate::{adapters::dto::base_dto::WelcomeResponse, domain::config::settings::Settings};

pub struct BaseController;

impl BaseController {
    /// GET /api/v1/
    pub async fn welcome(State(settings): State<Arc<Settings>>) -> Json<WelcomeResponse> {
        Json(WelcomeResponse {
            app_name: settings.app_name.clone(),
            app_version: settings.app_version.clone(),
        })
    }
}
