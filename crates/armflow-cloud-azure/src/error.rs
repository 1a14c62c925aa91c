//! Azure provider error types

use armflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("No credential source succeeded:\n{0}")]
    CredentialUnavailable(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("az not found. Please install the Azure CLI: https://aka.ms/azure-cli")]
    CliNotFound,

    #[error("az command failed: {0}")]
    CommandFailed(String),

    #[error("ARM request failed ({status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cloud error: {0}")]
    CloudError(#[from] CloudError),
}

pub type Result<T> = std::result::Result<T, AzureError>;

impl From<AzureError> for CloudError {
    fn from(err: AzureError) -> Self {
        match err {
            AzureError::CloudError(e) => e,
            AzureError::CredentialUnavailable(_) | AzureError::Authentication(_) => {
                CloudError::AuthenticationFailed(err.to_string())
            }
            other => CloudError::ApiError(other.to_string()),
        }
    }
}
