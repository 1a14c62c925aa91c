//! Azure provider for armflow
//!
//! Implements [`armflow_cloud::ResourceManager`] over the Azure Resource
//! Manager REST API.
//!
//! # Requirements
//!
//! - A service principal in `AZURE_TENANT_ID`, `AZURE_CLIENT_ID` and
//!   `AZURE_CLIENT_SECRET`, or a signed-in `az` CLI
//!
//! # Example
//!
//! ```ignore
//! use armflow_cloud_azure::{AzureProvider, DefaultCredential};
//! use armflow_cloud::Workflow;
//! use std::sync::Arc;
//!
//! let credential = Arc::new(DefaultCredential::new());
//! let provider = AzureProvider::connect(&settings.subscription_id, credential).await?;
//!
//! let report = Workflow::new(&provider, &settings).extend().await?;
//! println!("{}", report.upgrade_status);
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod lro;
pub mod provider;

pub use auth::{
    AccessToken, AzureCliCredential, DefaultCredential, EnvironmentCredential, MANAGEMENT_SCOPE,
    TokenCredential,
};
pub use client::{ArmClient, DEFAULT_ENDPOINT};
pub use error::{AzureError, Result};
pub use lro::{Method, PollState};
pub use provider::AzureProvider;
