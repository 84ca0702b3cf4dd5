//! Error taxonomy of the invitation lifecycle.

use intake_storage::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Stable reason code attached to a completeness failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    Required,
    UploadRequired,
    AtLeastOne,
}

/// First unmet completeness requirement.
///
/// `field` is a path such as `companyInfo.gstNumber` or `inventors[1].nationality`;
/// `message` is the human-readable text and is what `Display` prints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invitation not found")]
    NotFound,

    #[error("invitation has expired")]
    Expired,

    #[error("invitation has already been completed")]
    AlreadyCompleted,

    #[error(transparent)]
    ValidationFailed(#[from] ValidationError),

    #[error("unsupported document field: {0}")]
    UnsupportedDocumentField(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("failed to send invitation email: {0}")]
    DispatchFailed(String),

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => LifecycleError::NotFound,
            other => LifecycleError::Store(other),
        }
    }
}

impl From<crate::documents::UploadError> for LifecycleError {
    fn from(err: crate::documents::UploadError) -> Self {
        LifecycleError::UploadFailed(err.to_string())
    }
}
