//! Cloud provider error types

use crate::resource::ResourceKind;
use thiserror::Error;

/// Cloud provider errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("{kind} operation failed: {reason}")]
    OperationFailed { kind: ResourceKind, reason: String },

    #[error("Expected a {expected} reference, got a {actual}")]
    InvalidDependency {
        expected: ResourceKind,
        actual: ResourceKind,
    },

    #[error("{0} response carried no resource id")]
    MissingIdentifier(ResourceKind),

    #[error("Invalid operation handle: {0}")]
    InvalidHandle(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
