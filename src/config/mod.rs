//! Environment-driven settings.
//!
//! Variables are read once at startup into [`Settings`]. Numeric fields and
//! list fields are parsed here, so a malformed value stops the process before
//! it accepts any request.

mod error;

pub use error::ConfigError;

use std::{collections::BTreeSet, path::PathBuf};

use axum::http::HeaderValue;
use serde::Deserialize;

use crate::domain::config::settings::Settings;

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default = "default_app_name")]
    app_name: String,
    #[serde(default = "default_app_version")]
    app_version: String,
    #[serde(default)]
    openai_api_key: Option<String>,
    #[serde(default = "default_allowed_types")]
    file_allowed_types: String,
    #[serde(default = "default_max_size")]
    file_max_size: u64,
    #[serde(default = "default_chunk_size")]
    file_default_chunk_size: usize,
    mongodb_url: String,
    #[serde(default = "default_mongodb_database")]
    mongodb_database: String,
    #[serde(default = "default_files_dir")]
    files_dir: PathBuf,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    cors_allowed_origins: Option<String>,
}

fn default_app_name() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_allowed_types() -> String {
    "text/plain,application/pdf".to_string()
}

fn default_max_size() -> u64 {
    10
}

fn default_chunk_size() -> usize {
    512_000
}

fn default_mongodb_database() -> String {
    "mini_rag".to_string()
}

fn default_files_dir() -> PathBuf {
    PathBuf::from("assets/files")
}

fn default_port() -> u16 {
    8080
}

/// Loads settings from the process environment.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(std::env::vars())
}

/// Loads settings from explicit `(name, value)` pairs. Names are matched
/// case-insensitively, as with the process environment.
pub fn load_settings_from<I>(vars: I) -> Result<Settings, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let raw: RawSettings = envy::from_iter(vars)?;
    Settings::try_from(raw)
}

impl TryFrom<RawSettings> for Settings {
    type Error = ConfigError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let file_allowed_types = parse_mime_list(&raw.file_allowed_types)?;

        if raw.file_max_size == 0 {
            return Err(ConfigError::invalid("FILE_MAX_SIZE", "must be greater than 0"));
        }
        if raw.file_default_chunk_size == 0 {
            return Err(ConfigError::invalid(
                "FILE_DEFAULT_CHUNK_SIZE",
                "must be greater than 0",
            ));
        }

        let mongodb_url = raw.mongodb_url.trim().to_string();
        let has_host = mongodb_url
            .strip_prefix("mongodb://")
            .or_else(|| mongodb_url.strip_prefix("mongodb+srv://"))
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'));
        if !has_host {
            return Err(ConfigError::invalid(
                "MONGODB_URL",
                "expected a mongodb:// or mongodb+srv:// connection string",
            ));
        }

        // An explicit database name wins over any default database in the URL.
        let mongodb_database = raw.mongodb_database.trim().to_string();
        if mongodb_database.is_empty() {
            return Err(ConfigError::invalid("MONGODB_DATABASE", "must not be empty"));
        }

        let cors_allowed_origins = match raw.cors_allowed_origins.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(list) => Some(parse_origins(list)?),
        };

        Ok(Settings {
            app_name: raw.app_name,
            app_version: raw.app_version,
            openai_api_key: raw.openai_api_key.filter(|key| !key.trim().is_empty()),
            file_allowed_types,
            file_max_size: raw.file_max_size,
            file_default_chunk_size: raw.file_default_chunk_size,
            mongodb_url,
            mongodb_database,
            files_dir: raw.files_dir,
            port: raw.port,
            cors_allowed_origins,
        })
    }
}

/// Accepts either a JSON array (`["text/plain","application/pdf"]`) or a
/// comma-separated list.
fn parse_mime_list(value: &str) -> Result<BTreeSet<String>, ConfigError> {
    let value = value.trim();
    let entries: Vec<String> = if value.starts_with('[') {
        serde_json::from_str(value)
            .map_err(|e| ConfigError::invalid("FILE_ALLOWED_TYPES", e.to_string()))?
    } else {
        value.split(',').map(str::to_string).collect()
    };

    let mut types = BTreeSet::new();
    for entry in entries {
        let entry = entry.trim().to_ascii_lowercase();
        if entry.is_empty() {
            continue;
        }
        let well_formed = entry
            .split_once('/')
            .is_some_and(|(kind, sub)| !kind.is_empty() && !sub.is_empty() && !sub.contains('/'));
        if !well_formed {
            return Err(ConfigError::invalid(
                "FILE_ALLOWED_TYPES",
                format!("'{}' is not a MIME type", entry),
            ));
        }
        types.insert(entry);
    }

    if types.is_empty() {
        return Err(ConfigError::invalid("FILE_ALLOWED_TYPES", "must not be empty"));
    }
    Ok(types)
}

fn parse_origins(list: &str) -> Result<Vec<String>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map(|_| origin.to_string())
                .map_err(|_| {
                    ConfigError::invalid("CORS_ALLOWED_ORIGINS", format!("'{}' is not valid", origin))
                })
        })
        .collect()
}
