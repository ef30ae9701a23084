//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use mcpget_core::config::{AppConfigStore, DesktopConfigFile, ServerMap, SettingsStore};
use mcpget_core::install::LATEST;
use mcpget_core::ledger::{LedgerMap, LedgerStore};
use mcpget_core::registry::{DownloadDescriptor, PackageInfo, RegistryClient, RegistryError};
use mcpget_core::types::LaunchConfig;
use tempfile::TempDir;

/// Placeholder name nothing in the test environment sets.
pub const UNSET_VAR: &str = "MCPGET_TEST_UNSET_VAR_7F3A";

/// Desktop config and settings file in a fresh temp dir.
pub struct Fixture {
    pub temp: TempDir,
    pub desktop: DesktopConfigFile,
    pub settings: SettingsStore,
}

impl Fixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let desktop = DesktopConfigFile::new(
            temp.path()
                .join("Claude")
                .join("claude_desktop_config.json"),
        );
        let settings = SettingsStore::new(temp.path().join("mcp-get").join("config.json"));
        Self {
            temp,
            desktop,
            settings,
        }
    }
}

pub fn read_bytes(path: &Path) -> Option<Vec<u8>> {
    std::fs::read(path).ok()
}

pub fn npx(package: &str) -> LaunchConfig {
    LaunchConfig::new("npx").with_args(["-y", package])
}

struct Published {
    latest: Option<String>,
    config: LaunchConfig,
}

/// In-memory registry with per-name failure injection.
#[derive(Default)]
pub struct FakeRegistry {
    packages: RefCell<BTreeMap<String, Published>>,
    failing: RefCell<BTreeSet<String>>,
    downloads: Cell<usize>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `version` as the latest version of `name`.
    pub fn publish(&self, name: &str, version: &str, config: LaunchConfig) {
        self.packages.borrow_mut().insert(
            name.to_string(),
            Published {
                latest: Some(version.to_string()),
                config,
            },
        );
    }

    /// A package that exists but has no published version.
    pub fn publish_unversioned(&self, name: &str) {
        self.packages.borrow_mut().insert(
            name.to_string(),
            Published {
                latest: None,
                config: LaunchConfig::default(),
            },
        );
    }

    /// Make every request for `name` fail.
    pub fn fail(&self, name: &str) {
        self.failing.borrow_mut().insert(name.to_string());
    }

    pub fn download_count(&self) -> usize {
        self.downloads.get()
    }

    fn check(&self, name: &str) -> Result<(), RegistryError> {
        if self.failing.borrow().contains(name) {
            return Err(RegistryError::Request(format!(
                "Failed to fetch MCP server: {}",
                name
            )));
        }
        if !self.packages.borrow().contains_key(name) {
            return Err(RegistryError::NotFound(format!(
                "MCP server '{}' not found",
                name
            )));
        }
        Ok(())
    }
}

impl RegistryClient for FakeRegistry {
    fn get_package(&self, name: &str) -> Result<PackageInfo, RegistryError> {
        self.check(name)?;
        let packages = self.packages.borrow();
        let published = &packages[name];
        Ok(PackageInfo {
            name: name.to_string(),
            latest_version: published.latest.clone(),
            ..PackageInfo::default()
        })
    }

    fn download(&self, name: &str, version: &str) -> Result<DownloadDescriptor, RegistryError> {
        self.check(name)?;
        self.downloads.set(self.downloads.get() + 1);
        let packages = self.packages.borrow();
        let published = &packages[name];
        let version = if version == LATEST {
            published
                .latest
                .clone()
                .ok_or_else(|| RegistryError::Request("No versions available".to_string()))?
        } else {
            version.to_string()
        };
        Ok(DownloadDescriptor {
            version,
            repository: None,
            readme: None,
            install_config: published.config.clone(),
        })
    }
}

/// Counts whole-map writes to the wrapped desktop config.
pub struct CountingAppConfig<'a> {
    inner: &'a dyn AppConfigStore,
    writes: Cell<usize>,
}

impl<'a> CountingAppConfig<'a> {
    pub fn new(inner: &'a dyn AppConfigStore) -> Self {
        Self {
            inner,
            writes: Cell::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl AppConfigStore for CountingAppConfig<'_> {
    fn read(&self) -> ServerMap {
        self.inner.read()
    }

    fn write(&self, servers: &ServerMap) -> anyhow::Result<()> {
        self.writes.set(self.writes.get() + 1);
        self.inner.write(servers)
    }
}

/// Counts saves to the wrapped ledger.
pub struct CountingLedger<'a> {
    inner: &'a dyn LedgerStore,
    saves: Cell<usize>,
}

impl<'a> CountingLedger<'a> {
    pub fn new(inner: &'a dyn LedgerStore) -> Self {
        Self {
            inner,
            saves: Cell::new(0),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.get()
    }
}

impl LedgerStore for CountingLedger<'_> {
    fn load_servers(&self) -> anyhow::Result<LedgerMap> {
        self.inner.load_servers()
    }

    fn save_servers(&self, servers: &LedgerMap) -> anyhow::Result<()> {
        self.saves.set(self.saves.get() + 1);
        self.inner.save_servers(servers)
    }
}

/// Reads through to the wrapped ledger; every save fails.
pub struct FailingLedger<'a> {
    inner: &'a dyn LedgerStore,
}

impl<'a> FailingLedger<'a> {
    pub fn new(inner: &'a dyn LedgerStore) -> Self {
        Self { inner }
    }
}

impl LedgerStore for FailingLedger<'_> {
    fn load_servers(&self) -> anyhow::Result<LedgerMap> {
        self.inner.load_servers()
    }

    fn save_servers(&self, _servers: &LedgerMap) -> anyhow::Result<()> {
        anyhow::bail!("simulated crash before ledger write")
    }
}

/// Reads through to the wrapped desktop config; every write fails.
pub struct FailingAppConfig<'a> {
    inner: &'a dyn AppConfigStore,
}

impl<'a> FailingAppConfig<'a> {
    pub fn new(inner: &'a dyn AppConfigStore) -> Self {
        Self { inner }
    }
}

impl AppConfigStore for FailingAppConfig<'_> {
    fn read(&self) -> ServerMap {
        self.inner.read()
    }

    fn write(&self, _servers: &ServerMap) -> anyhow::Result<()> {
        anyhow::bail!("simulated crash before desktop config write")
    }
}
