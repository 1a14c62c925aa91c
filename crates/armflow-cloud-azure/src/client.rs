//! Azure Resource Manager REST client
//!
//! Thin wrapper over the ARM REST API: submits PUT/POST requests and checks
//! long-running operations once per call. The poll loop itself lives in
//! `armflow_cloud::poll_until_done`.

use crate::auth::{AccessToken, MANAGEMENT_SCOPE, TokenCredential};
use crate::error::{AzureError, Result};
use crate::lro::{
    self, ErrorEnvelope, InitialResponse, Method, OperationStatusBody, PollState,
};
use armflow_cloud::{OperationOutcome, PollStatus, ResourcePath};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, LOCATION};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";

/// Tokens closer than this to expiry are replaced before a request
const TOKEN_REFRESH_MARGIN_SECS: i64 = 300;

/// ARM client bound to one subscription
///
/// Holds the current access token. With a credential attached, the token is
/// re-acquired whenever it is about to expire.
pub struct ArmClient {
    client: reqwest::Client,
    endpoint: String,
    subscription_id: String,
    token: Mutex<AccessToken>,
    credential: Option<Arc<dyn TokenCredential>>,
}

impl ArmClient {
    pub fn new(subscription_id: impl Into<String>, token: AccessToken) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subscription_id: subscription_id.into(),
            token: Mutex::new(token),
            credential: None,
        }
    }

    /// Refresh the token from this credential when it nears expiry
    pub fn with_credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Point the client at another ARM endpoint (sovereign clouds, tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Full URL of a subscription-relative path
    pub fn resource_url(&self, path: &ResourcePath, api_version: &str) -> String {
        format!(
            "{}/subscriptions/{}/{}?api-version={}",
            self.endpoint, self.subscription_id, path, api_version
        )
    }

    /// Submit a PUT or POST and decide how its completion will be observed
    pub async fn begin(
        &self,
        method: Method,
        path: &ResourcePath,
        api_version: &str,
        body: &Value,
    ) -> Result<PollState> {
        let url = self.resource_url(path, api_version);
        tracing::debug!("{:?} {}", method, url);

        let request = match method {
            Method::Put => self.client.put(&url),
            Method::Post => self.client.post(&url),
        };
        let response = request
            .bearer_auth(self.bearer().await?)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        let initial = InitialResponse {
            status: status_line(status),
            async_operation: header(&headers, ASYNC_OPERATION_HEADER),
            location: header(&headers, LOCATION.as_str()),
            body: parse_body(&text)?,
        };
        Ok(PollState::from_initial(method, &url, initial))
    }

    /// Check an operation once
    pub async fn check(&self, state: &PollState) -> Result<PollStatus> {
        match state {
            PollState::Done { status, body } => Ok(finished(status.clone(), body.clone())),

            PollState::AsyncOperation { url, final_url } => {
                let (status, body) = self.get(url).await?;
                let body = body.ok_or_else(|| {
                    AzureError::MalformedResponse("empty operation status".to_string())
                })?;
                let operation: OperationStatusBody = serde_json::from_value(body)?;

                if lro::is_failed(&operation.status) {
                    let reason = operation
                        .error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| operation.status.clone());
                    return Ok(PollStatus::Failed(reason));
                }
                if !lro::is_succeeded(&operation.status) {
                    return Ok(PollStatus::Pending);
                }

                match final_url {
                    Some(final_url) => {
                        let (status, body) = self.get(final_url).await?;
                        Ok(finished(status_line(status), body))
                    }
                    None => Ok(finished(status_line(status), None)),
                }
            }

            PollState::Location { url } => {
                let (status, body) = self.get(url).await?;
                if status == StatusCode::ACCEPTED {
                    return Ok(PollStatus::Pending);
                }
                Ok(finished(status_line(status), body))
            }

            PollState::ProvisioningState { resource_url } => {
                let (status, body) = self.get(resource_url).await?;
                Ok(finished(status_line(status), body))
            }
        }
    }

    /// Current bearer token, refreshed first if it is about to expire
    async fn bearer(&self) -> Result<String> {
        let mut token = self.token.lock().await;

        if let Some(credential) = &self.credential {
            let margin = chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS);
            if token.expires_within(margin) {
                tracing::debug!("Access token expires soon, refreshing via {}", credential.name());
                *token = credential.get_token(MANAGEMENT_SCOPE).await?;
            }
        }
        Ok(token.token.clone())
    }

    async fn get(&self, url: &str) -> Result<(StatusCode, Option<Value>)> {
        let response = self
            .client
            .get(url)
            .bearer_auth(self.bearer().await?)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &text));
        }
        Ok((status, parse_body(&text)?))
    }
}

/// Map a final response to a poll result, honouring a failed provisioning state
fn finished(status: String, body: Option<Value>) -> PollStatus {
    let state = body.as_ref().and_then(lro::provisioning_state);
    match state {
        Some(state) if lro::is_failed(state) => {
            PollStatus::Failed(format!("provisioning state {}", state))
        }
        Some(state) if !lro::is_terminal(state) => PollStatus::Pending,
        _ => PollStatus::Succeeded(OperationOutcome {
            status,
            resource: body,
        }),
    }
}

/// "200 OK" style status line
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn parse_body(text: &str) -> Result<Option<Value>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(text)?))
}

fn api_error(status: StatusCode, text: &str) -> AzureError {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => AzureError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            message: envelope.error.message,
        },
        Err(_) => AzureError::Api {
            status: status.as_u16(),
            code: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: text.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(StatusCode::OK), "200 OK");
        assert_eq!(status_line(StatusCode::ACCEPTED), "202 Accepted");
    }

    #[test]
    fn test_resource_url() {
        let client = ArmClient::new("sub-1", AccessToken::new("t")).with_endpoint("http://localhost:1/");
        assert_eq!(
            client.resource_url(&ResourcePath::resource_group("rg"), "2021-04-01"),
            "http://localhost:1/subscriptions/sub-1/resourceGroups/rg?api-version=2021-04-01"
        );
    }

    #[test]
    fn test_api_error_envelope() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":"InvalidParameter","message":"bad prefix"}}"#,
        );
        match err {
            AzureError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "InvalidParameter");
                assert_eq!(message, "bad prefix");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_api_error_plain_text() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(
            err.to_string(),
            "ARM request failed (502): Bad Gateway: upstream down"
        );
    }

    #[test]
    fn test_finished_honours_provisioning_state() {
        let failed = finished(
            "200 OK".to_string(),
            Some(json!({"properties": {"provisioningState": "Failed"}})),
        );
        assert!(matches!(failed, PollStatus::Failed(ref r) if r.contains("Failed")));

        let pending = finished(
            "200 OK".to_string(),
            Some(json!({"properties": {"provisioningState": "Updating"}})),
        );
        assert_eq!(pending, PollStatus::Pending);

        let done = finished("204 No Content".to_string(), None);
        assert!(matches!(done, PollStatus::Succeeded(ref o) if o.status == "204 No Content"));
    }
}
