//! Azure implementation of ResourceManager

use crate::auth::{MANAGEMENT_SCOPE, TokenCredential};
use crate::client::ArmClient;
use crate::error::AzureError;
use crate::lro::{Method, PollState};
use armflow_cloud::{
    CloudError, OperationHandle, PollStatus, ResourceManager, ResourceRequest, Result,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Azure Resource Manager provider
pub struct AzureProvider {
    client: ArmClient,
}

impl AzureProvider {
    pub fn new(client: ArmClient) -> Self {
        Self { client }
    }

    /// Acquire a management token and bind it to the subscription
    ///
    /// The credential is kept so the token can be renewed before it expires.
    pub async fn connect(
        subscription_id: &str,
        credential: Arc<dyn TokenCredential>,
    ) -> std::result::Result<Self, AzureError> {
        tracing::info!("Resolving credentials");
        let token = credential.get_token(MANAGEMENT_SCOPE).await?;
        let client = ArmClient::new(subscription_id, token).with_credential(credential);
        Ok(Self::new(client))
    }

    async fn begin(&self, method: Method, request: &ResourceRequest) -> Result<OperationHandle> {
        let state = self
            .client
            .begin(method, &request.path, request.api_version(), &request.body)
            .await?;
        tracing::debug!("{} accepted, polling via {:?}", request.kind, strategy(&state));

        let token = serde_json::to_string(&state)?;
        Ok(OperationHandle::new(request.kind, token))
    }
}

fn strategy(state: &PollState) -> &'static str {
    match state {
        PollState::Done { .. } => "done",
        PollState::AsyncOperation { .. } => "Azure-AsyncOperation",
        PollState::Location { .. } => "Location",
        PollState::ProvisioningState { .. } => "provisioningState",
    }
}

#[async_trait]
impl ResourceManager for AzureProvider {
    fn name(&self) -> &str {
        "azure"
    }

    async fn begin_create_or_update(&self, request: &ResourceRequest) -> Result<OperationHandle> {
        self.begin(Method::Put, request).await
    }

    async fn begin_action(&self, request: &ResourceRequest) -> Result<OperationHandle> {
        self.begin(Method::Post, request).await
    }

    async fn poll(&self, handle: &OperationHandle) -> Result<PollStatus> {
        let state: PollState = serde_json::from_str(&handle.token)
            .map_err(|e| CloudError::InvalidHandle(format!("{}: {}", handle.kind, e)))?;
        Ok(self.client.check(&state).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessToken;
    use armflow_cloud::ResourceKind;

    #[tokio::test]
    async fn test_poll_rejects_foreign_token() {
        let provider = AzureProvider::new(ArmClient::new("sub", AccessToken::new("t")));
        let handle = OperationHandle::new(ResourceKind::Subnet, "not-a-state");

        let result = provider.poll(&handle).await;
        assert!(matches!(result, Err(CloudError::InvalidHandle(ref m)) if m.starts_with("subnet")));
    }

    #[tokio::test]
    async fn test_poll_done_state_needs_no_request() {
        // the endpoint is unreachable; a finished state must not touch it
        let provider = AzureProvider::new(
            ArmClient::new("sub", AccessToken::new("t")).with_endpoint("http://127.0.0.1:9"),
        );
        let state = PollState::Done {
            status: "200 OK".to_string(),
            body: None,
        };
        let handle = OperationHandle::new(
            ResourceKind::ResourceGroup,
            serde_json::to_string(&state).unwrap(),
        );

        match provider.poll(&handle).await.unwrap() {
            PollStatus::Succeeded(outcome) => assert_eq!(outcome.status, "200 OK"),
            other => panic!("Expected Succeeded, got {:?}", other),
        }
    }
}
