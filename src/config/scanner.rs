//! Scanner configuration (`.dx-scan.yaml`).
//!
//! ```yaml
//! practices:
//!   Java.Log4JConfigured: high
//!   Some.OtherPractice: off
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{home_config_dir, xdg_config_dir};
use crate::model::PracticeImpact;

/// Name of the per-repository configuration file.
pub const CONFIG_FILE_NAME: &str = ".dx-scan.yaml";

/// Name of the user-level configuration file.
pub const USER_CONFIG_FILE_NAME: &str = "config.yaml";

/// Practice overrides applied by the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Impact per practice key; `off` disables the practice.
    #[serde(default)]
    pub practices: BTreeMap<String, PracticeImpact>,
}

impl ScannerConfig {
    /// Parses a configuration file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads the first configuration found for `repo_root`.
    ///
    /// A missing or malformed file yields the default configuration.
    pub fn discover(repo_root: &Path) -> Self {
        let Some(path) = resolve_config_path(repo_root) else {
            debug!(repo = %repo_root.display(), "No scanner configuration found");
            return Self::default();
        };
        match Self::load_from_path(&path) {
            Ok(config) => {
                debug!(
                    path = %path.display(),
                    overrides = config.practices.len(),
                    "Loaded scanner configuration"
                );
                config
            }
            Err(e) => {
                warn!("Ignoring malformed scanner configuration: {e:#}");
                Self::default()
            }
        }
    }
}

/// Resolves the configuration file for a repository.
///
/// Priority:
/// 1. `{repo_root}/.dx-scan.yaml`
/// 2. `$XDG_CONFIG_HOME/dx-scan/config.yaml`
/// 3. `$HOME/.dx-scan/config.yaml`
pub fn resolve_config_path(repo_root: &Path) -> Option<PathBuf> {
    resolve_config_path_in(repo_root, xdg_config_dir(), home_config_dir())
}

fn resolve_config_path_in(
    repo_root: &Path,
    xdg_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    std::iter::once(repo_root.join(CONFIG_FILE_NAME))
        .chain(xdg_dir.map(|d| d.join(USER_CONFIG_FILE_NAME)))
        .chain(home_dir.map(|d| d.join(USER_CONFIG_FILE_NAME)))
        .find(|p| p.is_file())
}
