//! Credential resolution
//!
//! Tries each source in order and uses the first token obtained:
//!
//! 1. [`EnvironmentCredential`]: service principal secret from
//!    `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET`
//! 2. [`AzureCliCredential`]: the signed-in `az` CLI account

use crate::error::{AzureError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;

/// Scope of Azure Resource Manager tokens
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Bearer token for ARM requests
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_on: None,
        }
    }

    /// Whether the token is expired or will be within `margin`
    ///
    /// Tokens without a known expiry are treated as valid.
    pub fn expires_within(&self, margin: chrono::Duration) -> bool {
        self.expires_on
            .is_some_and(|expires_on| expires_on - Utc::now() <= margin)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// A source of access tokens
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Short name used in logs and error reports
    fn name(&self) -> &str;

    async fn get_token(&self, scope: &str) -> Result<AccessToken>;
}

// ============ Environment (service principal) ============

/// Client-credentials grant for a service principal
pub struct EnvironmentCredential {
    client: reqwest::Client,
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority_host: String,
}

impl EnvironmentCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
        }
    }

    pub fn with_authority_host(mut self, authority_host: impl Into<String>) -> Self {
        self.authority_host = authority_host.into().trim_end_matches('/').to_string();
        self
    }

    /// Build from environment variables; `None` when any of them is missing
    pub fn from_env() -> Option<Self> {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        let credential = Self::new(
            var("AZURE_TENANT_ID")?,
            var("AZURE_CLIENT_ID")?,
            var("AZURE_CLIENT_SECRET")?,
        );
        Some(match var("AZURE_AUTHORITY_HOST") {
            Some(host) => credential.with_authority_host(host),
            None => credential,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[async_trait]
impl TokenCredential for EnvironmentCredential {
    fn name(&self) -> &str {
        "EnvironmentCredential"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let url = format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host, self.tenant_id
        );

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", scope),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<TokenErrorResponse>(&text)
                .map(|e| e.error_description.unwrap_or(e.error))
                .unwrap_or(text);
            return Err(AzureError::Authentication(format!(
                "token request returned {}: {}",
                status, message
            )));
        }

        let token: TokenResponse = serde_json::from_str(&text)?;
        Ok(AccessToken {
            token: token.access_token,
            expires_on: token
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        })
    }
}

// ============ Azure CLI ============

/// Token from `az account get-access-token`
#[derive(Debug, Default)]
pub struct AzureCliCredential;

impl AzureCliCredential {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    #[serde(default, rename = "expires_on")]
    expires_on: Option<i64>,
}

/// Parse the JSON printed by `az account get-access-token`
pub fn parse_cli_token(output: &str) -> Result<AccessToken> {
    let token: CliToken = serde_json::from_str(output)?;
    Ok(AccessToken {
        token: token.access_token,
        expires_on: token
            .expires_on
            .and_then(|secs| DateTime::from_timestamp(secs, 0)),
    })
}

#[async_trait]
impl TokenCredential for AzureCliCredential {
    fn name(&self) -> &str {
        "AzureCliCredential"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let resource = scope.trim_end_matches("/.default");

        tracing::debug!("Running: az account get-access-token --resource {}", resource);

        let output = Command::new("az")
            .args([
                "account",
                "get-access-token",
                "--resource",
                resource,
                "--output",
                "json",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AzureError::CliNotFound,
                _ => AzureError::IoError(e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AzureError::CommandFailed(stderr.trim().to_string()));
        }

        parse_cli_token(&String::from_utf8_lossy(&output.stdout))
    }
}

// ============ Chain ============

/// Ordered chain of credential sources
pub struct DefaultCredential {
    sources: Vec<Box<dyn TokenCredential>>,
}

impl DefaultCredential {
    /// Environment service principal (when configured), then the Azure CLI
    pub fn new() -> Self {
        let mut sources: Vec<Box<dyn TokenCredential>> = Vec::new();
        if let Some(env) = EnvironmentCredential::from_env() {
            sources.push(Box::new(env));
        }
        sources.push(Box::new(AzureCliCredential::new()));
        Self { sources }
    }

    pub fn with_sources(sources: Vec<Box<dyn TokenCredential>>) -> Self {
        Self { sources }
    }
}

impl Default for DefaultCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    fn name(&self) -> &str {
        "DefaultCredential"
    }

    async fn get_token(&self, scope: &str) -> Result<AccessToken> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.get_token(scope).await {
                Ok(token) => {
                    tracing::info!("Authenticated via {}", source.name());
                    return Ok(token);
                }
                Err(e) => {
                    tracing::debug!("{} unavailable: {}", source.name(), e);
                    failures.push(format!("- {}: {}", source.name(), e));
                }
            }
        }

        if failures.is_empty() {
            failures.push("- no credential sources configured".to_string());
        }
        Err(AzureError::CredentialUnavailable(failures.join("\n")))
    }
}
