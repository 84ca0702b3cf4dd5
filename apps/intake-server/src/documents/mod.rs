//! Object storage for uploaded company documents.

mod local;

pub use local::LocalDocumentStorage;

use async_trait::async_trait;
use base64::Engine;
use intake_storage::DocumentDescriptor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file is empty")]
    Empty,

    #[error("file is {size} bytes, the limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("file is not valid base64: {0}")]
    Decode(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Where uploaded bytes end up.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Persist the file under `folder` and describe the stored object.
    async fn upload(
        &self,
        file: DecodedFile,
        folder: &str,
        original_filename: Option<&str>,
    ) -> Result<DocumentDescriptor, UploadError>;

    /// Remove a stored object. Deleting one that is already gone succeeds.
    async fn delete(&self, document: &DocumentDescriptor) -> Result<(), UploadError>;
}

/// Folder for one recipient's documents.
pub fn folder_for(email: &str) -> String {
    let safe: String = email
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '-' | '_' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = if safe.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        safe
    };
    format!("primary-invitations/{safe}")
}

/// Decoded upload body.
#[derive(Debug, PartialEq, Eq)]
pub struct DecodedFile {
    pub bytes: Vec<u8>,
    /// MIME type declared by a `data:` URL.
    pub mime: Option<String>,
}

/// Decode a plain base64 string or a `data:<mime>;base64,<payload>` URL.
pub fn decode_upload(file: &str, max_bytes: usize) -> Result<DecodedFile, UploadError> {
    let file = file.trim();
    let (mime, payload) = match file.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| UploadError::Decode("data URL has no payload".to_string()))?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or_else(|| UploadError::Decode("data URL is not base64".to_string()))?;
            (Some(mime).filter(|m| !m.is_empty()).map(str::to_string), payload)
        }
        None => (None, file),
    };

    // Cheap upper bound before allocating.
    let estimated = payload.len() / 4 * 3;
    if estimated > max_bytes + 3 {
        return Err(UploadError::TooLarge {
            size: estimated,
            limit: max_bytes,
        });
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| UploadError::Decode(e.to_string()))?;
    if bytes.is_empty() {
        return Err(UploadError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }
    Ok(DecodedFile { bytes, mime })
}

/// Best guess at a short format name (`pdf`, `png`, ...).
pub fn detect_format(original_filename: Option<&str>, mime: Option<&str>, bytes: &[u8]) -> String {
    let from_name = original_filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));
    if let Some(ext) = from_name {
        return ext;
    }

    let from_mime = match mime {
        Some("application/pdf") => Some("pdf"),
        Some("image/png") => Some("png"),
        Some("image/jpeg") => Some("jpg"),
        _ => None,
    };
    if let Some(ext) = from_mime {
        return ext.to_string();
    }

    if bytes.starts_with(b"%PDF") {
        "pdf"
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else {
        "bin"
    }
    .to_string()
}
