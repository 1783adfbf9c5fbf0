use std::{collections::BTreeSet, fmt, path::PathBuf};

/// Bytes per megabyte used for every MB to byte conversion.
pub const SIZE_SCALE: u64 = 1_048_576;

#[derive(Clone)]
pub struct Settings {
    pub app_name: String,
    pub app_version: String,
    pub openai_api_key: Option<String>,
    pub file_allowed_types: BTreeSet<String>,
    /// Upper bound for a single upload, in megabytes.
    pub file_max_size: u64,
    /// Largest single write issued while streaming an upload, in bytes.
    pub file_default_chunk_size: usize,
    pub mongodb_url: String,
    pub mongodb_database: String,
    pub files_dir: PathBuf,
    pub port: u16,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Settings {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.file_max_size.saturating_mul(SIZE_SCALE)
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("app_name", &self.app_name)
            .field("app_version", &self.app_version)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("file_allowed_types", &self.file_allowed_types)
            .field("file_max_size", &self.file_max_size)
            .field("file_default_chunk_size", &self.file_default_chunk_size)
            .field("mongodb_url", &"<redacted>")
            .field("mongodb_database", &self.mongodb_database)
            .field("files_dir", &self.files_dir)
            .field("port", &self.port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .finish()
    }
}
