//! ARM long-running operation state
//!
//! The state is chosen from the initial response and serialised into the
//! operation handle token, so polling needs nothing but the token.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Put,
    Post,
}

/// How to find out whether an operation has finished
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PollState {
    /// The initial response was already final
    Done {
        status: String,
        body: Option<Value>,
    },
    /// Poll the `Azure-AsyncOperation` URL, then fetch `final_url` if any
    AsyncOperation {
        url: String,
        final_url: Option<String>,
    },
    /// Poll the `Location` URL until it stops answering 202
    Location { url: String },
    /// Re-read the resource until `provisioningState` is terminal
    ProvisioningState { resource_url: String },
}

/// Header-derived facts of an initial PUT/POST response
#[derive(Debug, Clone, Default)]
pub struct InitialResponse {
    pub status: String,
    pub async_operation: Option<String>,
    pub location: Option<String>,
    pub body: Option<Value>,
}

impl PollState {
    /// Pick the polling strategy for an accepted request
    pub fn from_initial(method: Method, resource_url: &str, response: InitialResponse) -> Self {
        if let Some(url) = response.async_operation {
            let final_url = match method {
                Method::Put => Some(resource_url.to_string()),
                Method::Post => response.location,
            };
            return PollState::AsyncOperation { url, final_url };
        }

        if let Some(url) = response.location {
            return PollState::Location { url };
        }

        let pending = response
            .body
            .as_ref()
            .and_then(provisioning_state)
            .is_some_and(|state| !is_terminal(state));
        if method == Method::Put && pending {
            return PollState::ProvisioningState {
                resource_url: resource_url.to_string(),
            };
        }

        PollState::Done {
            status: response.status,
            body: response.body,
        }
    }
}

/// `properties.provisioningState` of a resource body
pub fn provisioning_state(body: &Value) -> Option<&str> {
    body.pointer("/properties/provisioningState")
        .and_then(|v| v.as_str())
}

pub fn is_terminal(state: &str) -> bool {
    is_succeeded(state) || is_failed(state)
}

pub fn is_succeeded(state: &str) -> bool {
    state.eq_ignore_ascii_case("Succeeded")
}

pub fn is_failed(state: &str) -> bool {
    state.eq_ignore_ascii_case("Failed") || state.eq_ignore_ascii_case("Canceled")
}

/// Body of an `Azure-AsyncOperation` status resource
#[derive(Debug, Clone, Deserialize)]
pub struct OperationStatusBody {
    pub status: String,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// ARM error envelope: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
