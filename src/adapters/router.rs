use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::adapters::{
    controllers::{
        base_controller::BaseController,
        data_controller::{DataController, MULTIPART_FRAMING_ALLOWANCE},
        health_controller::HealthController,
    },
    state::AppState,
};

pub fn build_router(app_state: AppState) -> Router {
    let cors = match &app_state.settings.cors_allowed_origins {
        Some(allowed_origins) => {
            let origins: Vec<HeaderValue> = allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    };

    let body_limit = app_state
        .settings
        .max_file_size_bytes()
        .saturating_add(MULTIPART_FRAMING_ALLOWANCE);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let base_routes = Router::new()
        .route("/api/v1/", get(BaseController::welcome))
        .route("/api/v1/health", get(HealthController::health_check));

    let data_routes = Router::new()
        .route(
            "/api/v1/data/upload/{project_id}",
            post(DataController::upload_file),
        )
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .merge(base_routes)
        .merge(data_routes)
        .layer(cors)
        .with_state(app_state)
}
