//! Filesystem-backed document storage.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use intake_storage::DocumentDescriptor;
use tracing::debug;
use uuid::Uuid;

use super::{detect_format, DecodedFile, DocumentStorage, UploadError};

/// Writes files under `root` and addresses them relative to `base_url`.
///
/// The server mounts `root` at `/uploads`, so `url` and `secure_url` are the
/// same address.
pub struct LocalDocumentStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalDocumentStorage {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl DocumentStorage for LocalDocumentStorage {
    async fn upload(
        &self,
        file: DecodedFile,
        folder: &str,
        original_filename: Option<&str>,
    ) -> Result<DocumentDescriptor, UploadError> {
        let DecodedFile { bytes, mime } = file;
        let format = detect_format(original_filename, mime.as_deref(), &bytes);
        let public_id = format!("{}/{}", folder.trim_matches('/'), Uuid::new_v4());
        let relative = format!("{public_id}.{format}");

        let path = self.root.join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| UploadError::Backend(e.to_string()))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| UploadError::Backend(e.to_string()))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Stored document");

        let url = format!("{}/{}", self.base_url, relative);
        Ok(DocumentDescriptor {
            public_id,
            secure_url: url.clone(),
            url,
            original_filename: original_filename.map(str::to_string),
            bytes: bytes.len() as u64,
            format,
            uploaded_at: Utc::now(),
        })
    }

    async fn delete(&self, document: &DocumentDescriptor) -> Result<(), UploadError> {
        let path = self
            .root
            .join(format!("{}.{}", document.public_id, document.format));
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed document");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UploadError::Backend(e.to_string())),
        }
    }
}
