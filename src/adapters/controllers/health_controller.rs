use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::System;
use tracing::info;

use crate::adapters::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub app_name: String,
    pub app_version: String,
    pub datastore: DatastoreStatus,
    pub config: HealthConfigInfo,
    pub metrics: SystemMetrics,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DatastoreStatus {
    pub database: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct HealthConfigInfo {
    pub max_size_bytes: u64,
    pub chunk_size: usize,
    pub allowed_mime_types: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub cpu_usage_percent: f32,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub memory_usage_percent: f32,
}

pub struct HealthController;

impl HealthController {
    /// GET /api/v1/health
    pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
        info!("Health check requested");

        let datastore_up = app_state.datastore.ping().await;
        let settings = &app_state.settings;

        let config = HealthConfigInfo {
            max_size_bytes: settings.max_file_size_bytes(),
            chunk_size: settings.file_default_chunk_size,
            allowed_mime_types: settings.file_allowed_types.iter().cloned().collect(),
        };

        let (status, datastore_status) = if datastore_up {
            ("healthy", "up")
        } else {
            ("degraded", "down")
        };

        Json(HealthResponse {
            status: status.to_string(),
            app_name: settings.app_name.clone(),
            app_version: settings.app_version.clone(),
            datastore: DatastoreStatus {
                database: app_state.datastore.database().to_string(),
                status: datastore_status.to_string(),
            },
            config,
            metrics: collect_metrics(),
            checked_at: Utc::now(),
        })
    }
}

fn collect_metrics() -> SystemMetrics {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let memory_used = sys.used_memory();
    let memory_total = sys.total_memory();
    let memory_usage_percent = if memory_total > 0 {
        (memory_used as f32 / memory_total as f32) * 100.0
    } else {
        0.0
    };

    SystemMetrics {
        cpu_usage_percent: sys.global_cpu_usage(),
        memory_used_bytes: memory_used,
        memory_total_bytes: memory_total,
        memory_usage_percent,
    }
}
