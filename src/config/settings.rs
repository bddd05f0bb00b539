//! User settings from `$HOME/.dx-scan/settings.json`.
//!
//! The `env` map is a fallback for environment variables, so provider tokens
//! can live in the settings file instead of the shell profile.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use super::home_config_dir;
use crate::services::ProviderKind;

/// Settings loaded from `$HOME/.dx-scan/settings.json`.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable fallbacks.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path. A missing file yields defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn settings_path() -> Result<PathBuf> {
        home_config_dir()
            .map(|dir| dir.join("settings.json"))
            .context("Failed to determine home directory")
    }

    /// Returns an environment variable, falling back to the settings file.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        env::var(key)
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| self.env.get(key).cloned())
    }

    /// Access token for `provider` (`GITLAB_TOKEN`, `GITHUB_TOKEN`, `BITBUCKET_TOKEN`).
    pub fn provider_token(&self, provider: ProviderKind) -> Option<String> {
        self.get_env_var(provider.token_env_var())
    }
}
