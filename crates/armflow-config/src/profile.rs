//! Optional YAML profile
//!
//! Looked up in this order:
//! 1. `ARMFLOW_CONFIG_PATH` (direct path)
//! 2. `~/.config/armflow/config.yaml`
//!
//! A missing profile is not an error; every field falls back to its default.

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_PATH_ENV: &str = "ARMFLOW_CONFIG_PATH";
const PROFILE_DIR: &str = "armflow";
const PROFILE_FILE: &str = "config.yaml";

/// Values that may be pinned in a profile instead of passed on every run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub location: Option<String>,
    pub admin_username: Option<String>,
    pub extension_version: Option<u32>,
    pub poll_interval_secs: Option<u64>,
}

impl Profile {
    /// Find the profile file, if any
    pub fn find_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!("{} points to a missing file: {}", CONFIG_PATH_ENV, path.display());
        }

        let global = dirs::config_dir()?.join(PROFILE_DIR).join(PROFILE_FILE);
        global.exists().then_some(global)
    }

    /// Load the profile from its default location, or an empty one
    pub fn load() -> Result<Self> {
        match Self::find_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let profile = serde_yaml::from_str(&content).map_err(|source| ConfigError::Profile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded profile from {}", path.display());
        Ok(profile)
    }
}
