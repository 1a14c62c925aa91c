//! Long-running operations and the fixed-interval poll loop

use crate::error::{CloudError, Result};
use crate::provider::ResourceManager;
use crate::resource::ResourceKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

/// Handle to a submitted long-running operation
///
/// The token is opaque to callers; only the provider that issued it reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationHandle {
    pub kind: ResourceKind,
    pub token: String,
}

impl OperationHandle {
    pub fn new(kind: ResourceKind, token: impl Into<String>) -> Self {
        Self {
            kind,
            token: token.into(),
        }
    }
}

/// Result of a single poll
#[derive(Debug, Clone, PartialEq)]
pub enum PollStatus {
    /// Still running
    Pending,
    /// Finished successfully
    Succeeded(OperationOutcome),
    /// Reached a terminal failure state
    Failed(String),
}

/// Final state of a finished operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOutcome {
    /// Status line of the final response (e.g., "200 OK")
    pub status: String,

    /// Final resource representation, when the operation produces one
    pub resource: Option<serde_json::Value>,
}

/// Poll loop configuration
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed delay between polls
    pub interval: Duration,

    /// Give up after this many pending polls; `None` waits for a terminal state
    pub max_polls: Option<u32>,
}

impl PollConfig {
    pub fn fixed(interval: Duration) -> Self {
        Self {
            interval,
            max_polls: None,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(10))
    }
}

/// Block until the operation reaches a terminal state
pub async fn poll_until_done<M>(
    manager: &M,
    handle: &OperationHandle,
    config: &PollConfig,
) -> Result<OperationOutcome>
where
    M: ResourceManager + ?Sized,
{
    let mut polls: u32 = 0;

    loop {
        match manager.poll(handle).await? {
            PollStatus::Succeeded(outcome) => return Ok(outcome),
            PollStatus::Failed(reason) => {
                return Err(CloudError::OperationFailed {
                    kind: handle.kind,
                    reason,
                });
            }
            PollStatus::Pending => {}
        }

        polls += 1;
        if let Some(max) = config.max_polls {
            if polls >= max {
                return Err(CloudError::Timeout(format!(
                    "{} operation still pending after {} polls",
                    handle.kind, polls
                )));
            }
        }

        tracing::debug!("{} operation pending (poll {})", handle.kind, polls);
        sleep(config.interval).await;
    }
}
