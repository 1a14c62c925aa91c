//! armflow cloud core
//!
//! Provider-neutral pieces of the two armflow workflows: the
//! [`ResourceManager`] capability trait, long-running operation polling,
//! desired-state descriptors and the step sequences themselves.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │        armflow-create / armflow-addextension    │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 armflow-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │  Workflow (fixed, sequential steps)      │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────────────┐     │
//! │  │ descriptors  │  │ poll_until_done      │     │
//! │  └──────────────┘  └──────────────────────┘     │
//! │        trait ResourceManager { ... }            │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//!           ┌───────▼────────┐
//!           │ azure provider │
//!           └────────────────┘
//! ```

pub mod descriptor;
pub mod error;
pub mod operation;
pub mod provider;
pub mod resource;
pub mod script;
pub mod secret;
pub mod workflow;

// Re-exports
pub use error::{CloudError, Result};
pub use operation::{OperationHandle, OperationOutcome, PollConfig, PollStatus, poll_until_done};
pub use provider::ResourceManager;
pub use resource::{ProvisionedResource, ResourceKind, ResourcePath, ResourceRequest};
pub use secret::AdminCredentials;
pub use workflow::{ExtensionReport, ProvisionReport, Workflow, act_and_wait, submit_and_wait};
