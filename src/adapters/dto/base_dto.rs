use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct WelcomeResponse {
    pub app_name: String,
    pub app_version: String,
}
