//! armflow configuration
//!
//! Resolves an immutable [`Settings`] value once at startup. Sources, highest
//! priority first:
//!
//! 1. command-line overrides ([`Overrides`])
//! 2. environment (`AZURE_SUBSCRIPTION_ID`, `MS_ALIAS`)
//! 3. the optional YAML [`Profile`]
//! 4. built-in defaults

pub mod error;
pub mod names;
pub mod profile;

pub use error::*;
pub use names::{BASTION_SUBNET_NAME, ResourceNames};
pub use profile::Profile;

use std::time::Duration;

pub const SUBSCRIPTION_ENV: &str = "AZURE_SUBSCRIPTION_ID";
pub const ALIAS_ENV: &str = "MS_ALIAS";

pub const DEFAULT_LOCATION: &str = "westus2";
pub const DEFAULT_PREFIX: &str = "armflow";
pub const DEFAULT_ADMIN_USERNAME: &str = "azureuser";
pub const DEFAULT_EXTENSION_VERSION: u32 = 1;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Whether a workflow can run without `MS_ALIAS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixPolicy {
    /// `MS_ALIAS` (or `--prefix`) must be given
    Required,
    /// Fall back to the given prefix
    DefaultTo(&'static str),
}

/// Values passed on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prefix: Option<String>,
    pub location: Option<String>,
    pub poll_interval_secs: Option<u64>,
}

/// Run configuration, built once and passed by reference to every step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub subscription_id: String,
    pub prefix: String,
    pub location: String,
    pub admin_username: String,
    pub extension_version: u32,
    pub poll_interval: Duration,
}

impl Settings {
    /// Resolve settings from the process environment and the default profile
    ///
    /// The subscription is checked before anything else is read.
    pub fn load(overrides: Overrides, policy: PrefixPolicy) -> Result<Self> {
        let lookup = |key: &str| std::env::var(key).ok();
        require(&lookup, SUBSCRIPTION_ENV)?;

        let profile = Profile::load()?;
        Self::from_sources(lookup, &profile, overrides, policy)
    }

    /// Resolve settings from explicit sources
    pub fn from_sources<F>(
        lookup: F,
        profile: &Profile,
        overrides: Overrides,
        policy: PrefixPolicy,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let subscription_id = require(&lookup, SUBSCRIPTION_ENV)?;

        let prefix = match non_empty(overrides.prefix).or_else(|| non_empty(lookup(ALIAS_ENV))) {
            Some(prefix) => prefix,
            None => match policy {
                PrefixPolicy::Required => {
                    return Err(ConfigError::MissingEnvVar(ALIAS_ENV.to_string()));
                }
                PrefixPolicy::DefaultTo(prefix) => prefix.to_string(),
            },
        };
        validate_prefix(&prefix)?;

        let location = non_empty(overrides.location)
            .or_else(|| non_empty(profile.location.clone()))
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        let admin_username = non_empty(profile.admin_username.clone())
            .unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());

        let poll_secs = overrides.poll_interval_secs.or(profile.poll_interval_secs);
        let poll_interval = match poll_secs {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    key: "poll_interval_secs".to_string(),
                    value: "0".to_string(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            subscription_id,
            prefix,
            location,
            admin_username,
            extension_version: profile
                .extension_version
                .unwrap_or(DEFAULT_EXTENSION_VERSION),
            poll_interval,
        })
    }

    pub fn names(&self) -> ResourceNames {
        ResourceNames::new(&self.prefix)
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(key)).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn validate_prefix(prefix: &str) -> Result<()> {
    let valid = prefix
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ConfigError::InvalidValue {
            key: ALIAS_ENV.to_string(),
            value: prefix.to_string(),
        });
    }
    Ok(())
}
