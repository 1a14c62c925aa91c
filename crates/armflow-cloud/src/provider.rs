//! Resource manager trait definition

use crate::error::Result;
use crate::operation::{OperationHandle, PollStatus};
use crate::resource::ResourceRequest;
use async_trait::async_trait;

/// Capability interface to a resource-management control plane
///
/// Every mutating call returns a handle to a long-running operation. Callers
/// drive it to completion with [`crate::poll_until_done`].
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Returns the provider name (e.g., "azure")
    fn name(&self) -> &str;

    /// Submit a create-or-update (PUT) of the described resource
    async fn begin_create_or_update(&self, request: &ResourceRequest) -> Result<OperationHandle>;

    /// Submit an action (POST) against an existing resource
    async fn begin_action(&self, request: &ResourceRequest) -> Result<OperationHandle>;

    /// Check an operation once
    async fn poll(&self, handle: &OperationHandle) -> Result<PollStatus>;
}
