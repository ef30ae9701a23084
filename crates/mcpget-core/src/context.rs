//! Application context shared by the CLI commands.

use std::path::Path;

use crate::config::{DesktopConfigFile, Settings, SettingsStore};
use crate::ledger::LedgerStore;
use crate::registry::HttpRegistryClient;

/// Settings loaded once per invocation, plus the stores built from them.
///
/// Frontends create this once and pass the stores by reference to the
/// [`Installer`](crate::install::Installer).
#[derive(Debug, Clone)]
pub struct AppContext {
    settings_store: SettingsStore,
    settings: Settings,
    desktop_config: DesktopConfigFile,
}

impl AppContext {
    /// Load settings from the default location.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_store(SettingsStore::from_default_path()?)
    }

    /// Load settings from an explicit store (for testing).
    pub fn from_store(settings_store: SettingsStore) -> anyhow::Result<Self> {
        let settings = settings_store.load()?;
        let desktop_config = DesktopConfigFile::new(&settings.config_path);
        Ok(Self {
            settings_store,
            settings,
            desktop_config,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_store(&self) -> &SettingsStore {
        &self.settings_store
    }

    pub fn settings_path(&self) -> &Path {
        self.settings_store.path()
    }

    pub fn ledger(&self) -> &dyn LedgerStore {
        &self.settings_store
    }

    /// Desktop config at the configured `configPath`.
    pub fn desktop_config(&self) -> &DesktopConfigFile {
        &self.desktop_config
    }

    pub fn registry_client(&self) -> anyhow::Result<HttpRegistryClient> {
        HttpRegistryClient::new(&self.settings.api_url, self.settings.token.clone())
    }
}
