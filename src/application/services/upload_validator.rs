use std::collections::BTreeSet;

use uuid::Uuid;

use crate::{
    application::error::ApplicationError,
    domain::config::settings::{Settings, SIZE_SCALE},
};

const TOKEN_ALPHABET: &[u8; 62] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of the random prefix of every generated file id.
pub const TOKEN_LENGTH: usize = 16;

/// Byte caps, so token + name stays under the usual 255-byte file name limit.
const MAX_FILE_NAME_BYTES: usize = 200;
const MAX_EXTENSION_BYTES: usize = 16;
const FALLBACK_FILE_NAME: &str = "file";

/// Type and size checks for incoming files. Performs no I/O.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    allowed_types: BTreeSet<String>,
    max_size_bytes: u64,
}

impl UploadValidator {
    pub fn new(allowed_types: BTreeSet<String>, max_size_mb: u64) -> Self {
        Self {
            allowed_types: allowed_types
                .into_iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .collect(),
            max_size_bytes: max_size_mb.saturating_mul(SIZE_SCALE),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.file_allowed_types.clone(), settings.file_max_size)
    }

    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    pub fn validate(
        &self,
        declared_mime_type: &str,
        declared_size_bytes: u64,
    ) -> Result<(), ApplicationError> {
        let essence = mime_essence(declared_mime_type);
        if !self.allowed_types.contains(&essence) {
            return Err(ApplicationError::TypeNotSupported(essence));
        }
        if declared_size_bytes > self.max_size_bytes {
            return Err(ApplicationError::SizeExceeded {
                limit: self.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Validates the declared metadata and mints the on-disk file id.
    pub fn validate_and_name(
        &self,
        declared_mime_type: &str,
        declared_size_bytes: u64,
        original_file_name: &str,
    ) -> Result<String, ApplicationError> {
        self.validate(declared_mime_type, declared_size_bytes)?;
        Ok(generate_file_id(&sanitize_file_name(original_file_name)))
    }
}

/// `text/plain; charset=utf-8` -> `text/plain`
fn mime_essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

pub fn generate_file_id(sanitized_file_name: &str) -> String {
    format!("{}_{}", generate_token(), sanitized_file_name)
}

/// Random alphanumeric token drawn from the 122 random bits of a v4 UUID.
pub fn generate_token() -> String {
    let mut entropy = Uuid::new_v4().as_u128();
    (0..TOKEN_LENGTH)
        .map(|_| {
            let index = (entropy % TOKEN_ALPHABET.len() as u128) as usize;
            entropy /= TOKEN_ALPHABET.len() as u128;
            TOKEN_ALPHABET[index] as char
        })
        .collect()
}

/// Reduces a client supplied name to a single safe path segment, keeping
/// its extension.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .trim()
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or("");

    let cleaned: String = base
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('_')
            } else {
                None
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return FALLBACK_FILE_NAME.to_string();
    }
    truncate_preserving_extension(cleaned)
}

fn truncate_preserving_extension(name: &str) -> String {
    if name.len() <= MAX_FILE_NAME_BYTES {
        return name.to_string();
    }

    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.len() <= MAX_EXTENSION_BYTES);

    match extension {
        Some(ext) => {
            let stem = prefix_within(name, MAX_FILE_NAME_BYTES - ext.len() - 1);
            format!("{}.{}", stem, ext)
        }
        None => prefix_within(name, MAX_FILE_NAME_BYTES).to_string(),
    }
}

/// Longest prefix of at most `max_bytes` that ends on a char boundary.
fn prefix_within(s: &str, max_bytes: usize) -> &str {
    let mut end = max_bytes.min(s.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
