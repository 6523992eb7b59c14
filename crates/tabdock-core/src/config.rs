//! Tab strip configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

/// Environment variable pointing at a config file
pub const CONFIG_ENV: &str = "TABDOCK_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How long an external drag must hover a tab before it is activated
    pub hover_activate_delay_ms: u64,
    /// Drag data type that marks a drag as one of our own tabs
    pub tab_drag_type: String,
    /// Context menu options
    pub menu: MenuConfig,
    /// Default log filter when `RUST_LOG` is unset
    pub log_filter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Offer "Reload Icon & Title" after the standard actions
    pub reload_icon_title: bool,
}

impl Config {
    pub fn hover_activate_delay(&self) -> Duration {
        Duration::from_millis(self.hover_activate_delay_ms)
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&raw)?;

        if config.tab_drag_type.trim().is_empty() {
            return Err(CoreError::Config(
                "tab_drag_type cannot be empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// Load from `$TABDOCK_CONFIG`, else the per-user config file if it
    /// exists, else defaults.
    pub fn locate() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        let path = Self::config_dir().join("config.json");
        if path.is_file() {
            return Self::load(&path);
        }

        Ok(Self::default())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("tabdock"))
            .unwrap_or_else(|| PathBuf::from(".tabdock"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hover_activate_delay_ms: 500,
            tab_drag_type: "application/x-tabdock-tab".to_string(),
            menu: MenuConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}
