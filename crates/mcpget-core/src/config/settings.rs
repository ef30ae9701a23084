//! Persisted settings record for mcp-get.
//!
//! One JSON file holds the API settings and the installation ledger. Every
//! mutation is load-modify-save on the whole file with no locking or atomic
//! rename, so a concurrent writer can lose changes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::paths::{default_desktop_config_path, default_settings_path};
use crate::types::InstalledServer;

/// Registry used when none is configured.
pub const DEFAULT_API_URL: &str = "https://api.mcpskills.dev";

/// Contents of the settings file. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Desktop config file this tool writes to
    #[serde(default = "default_desktop_config_path")]
    pub config_path: PathBuf,

    /// Installation ledger, keyed by server name
    #[serde(default)]
    pub installed_servers: BTreeMap<String, InstalledServer>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: None,
            username: None,
            api_url: default_api_url(),
            config_path: default_desktop_config_path(),
            installed_servers: BTreeMap::new(),
        }
    }
}

impl Settings {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }
}

/// Settings file on disk.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location (or `$MCP_GET_CONFIG_DIR`).
    pub fn from_default_path() -> anyhow::Result<Self> {
        Ok(Self::new(default_settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> anyhow::Result<Settings> {
        if !self.path.exists() {
            debug!("No settings file at {}, using defaults", self.path.display());
            return Ok(Settings::default());
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read settings file: {}", self.path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse settings file: {}", self.path.display()))
    }

    pub fn save(&self, settings: &Settings) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create settings directory: {}", parent.display())
            })?;
        }
        let bytes = serde_json::to_vec_pretty(settings).context("Failed to serialize settings")?;
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("Failed to write settings file: {}", self.path.display()))?;
        Ok(())
    }

    /// Load, apply `change`, save.
    pub fn update<F>(&self, change: F) -> anyhow::Result<Settings>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.load()?;
        change(&mut settings);
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn set_api_url(&self, url: &str) -> anyhow::Result<()> {
        let url = url.trim_end_matches('/').to_string();
        self.update(|settings| settings.api_url = url)?;
        Ok(())
    }

    pub fn set_config_path(&self, path: &Path) -> anyhow::Result<()> {
        let path = path.to_path_buf();
        self.update(|settings| settings.config_path = path)?;
        Ok(())
    }
}
