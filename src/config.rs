//! Settings, scanner configuration and repository addressing.

pub mod repository_uri;
pub mod scanner;
pub mod settings;

pub use repository_uri::RepositoryUri;
pub use scanner::ScannerConfig;
pub use settings::Settings;

use std::path::PathBuf;

/// Per-user directory under `$HOME`.
pub const HOME_DIR_NAME: &str = ".dx-scan";

/// Application directory name under the XDG config home.
pub const XDG_DIR_NAME: &str = "dx-scan";

/// Returns `$XDG_CONFIG_HOME/dx-scan`, defaulting to `$HOME/.config/dx-scan`.
pub fn xdg_config_dir() -> Option<PathBuf> {
    if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg_home.is_empty() {
            return Some(PathBuf::from(xdg_home).join(XDG_DIR_NAME));
        }
    }

    dirs::home_dir().map(|home| home.join(".config").join(XDG_DIR_NAME))
}

/// Returns `$HOME/.dx-scan`.
pub fn home_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HOME_DIR_NAME))
}
