//! Install, update and remove servers across the desktop config and the ledger.
//!
//! There is no transaction spanning the two stores. Every mutation writes the
//! desktop config first and the ledger second, so an interrupted operation
//! leaves at worst a ledger entry that is stale, never a runnable desktop
//! entry the ledger does not know about. Re-running the operation for the same
//! name converges both stores.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::spec::{LATEST, PackageSpec};
use crate::config::AppConfigStore;
use crate::env::find_unresolved;
use crate::ledger::{LedgerMap, LedgerStore};
use crate::registry::{RegistryClient, RegistryError};
use crate::types::{InstallSource, InstalledServer, LaunchConfig};

/// Version recorded for servers installed from a user-authored config.
pub const CUSTOM_VERSION: &str = "custom";

/// Which of the two stores an I/O failure hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    AppConfig,
    Ledger,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::AppConfig => f.write_str("desktop config"),
            StoreKind::Ledger => f.write_str("installation ledger"),
        }
    }
}

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("{name}@{version} is already installed. Use --force to reinstall.")]
    AlreadyInstalled { name: String, version: String },

    #[error("MCP server '{0}' is not installed")]
    NotInstalled(String),

    #[error("{0}")]
    FetchFailed(String),

    #[error("No versions available for '{0}'")]
    NoVersionsAvailable(String),

    #[error("Failed to write {store}")]
    ConfigWriteFailed {
        store: StoreKind,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to read {store}")]
    ConfigReadFailed {
        store: StoreKind,
        #[source]
        source: anyhow::Error,
    },
}

impl From<RegistryError> for InstallError {
    fn from(err: RegistryError) -> Self {
        InstallError::FetchFailed(err.message().to_string())
    }
}

/// Request to install a server from the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub name: String,
    pub version: String,
    pub force: bool,
    /// Extra env merged over the descriptor's env
    pub env: BTreeMap<String, String>,
}

impl InstallRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: LATEST.to_string(),
            force: false,
            env: BTreeMap::new(),
        }
    }

    pub fn from_spec(spec: PackageSpec) -> Self {
        Self::new(spec.name).with_version(spec.version)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_env_map(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub name: String,
    pub version: String,
    pub config: LaunchConfig,
    /// Placeholders with no value in the current environment
    pub required_env: Vec<String>,
    pub source: InstallSource,
}

/// Result of a successful single-server update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated {
        previous_version: String,
        report: InstallReport,
    },
    /// Ledger already records the registry's latest version; nothing written.
    AlreadyLatest { name: String, version: String },
}

impl UpdateOutcome {
    pub fn name(&self) -> &str {
        match self {
            UpdateOutcome::Updated { report, .. } => &report.name,
            UpdateOutcome::AlreadyLatest { name, .. } => name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            UpdateOutcome::Updated { report, .. } => &report.version,
            UpdateOutcome::AlreadyLatest { version, .. } => version,
        }
    }

    pub fn is_already_latest(&self) -> bool {
        matches!(self, UpdateOutcome::AlreadyLatest { .. })
    }
}

#[derive(Debug)]
pub struct BulkUpdateEntry {
    pub name: String,
    pub result: Result<UpdateOutcome, InstallError>,
}

/// Per-server results of updating everything in the ledger.
#[derive(Debug, Default)]
pub struct BulkUpdateReport {
    pub entries: Vec<BulkUpdateEntry>,
}

impl BulkUpdateReport {
    pub fn updated(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.result, Ok(UpdateOutcome::Updated { .. })))
            .count()
    }

    pub fn already_latest(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.result, Ok(UpdateOutcome::AlreadyLatest { .. })))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_err()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Installed vs. latest published version, without installing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    pub name: String,
    pub installed_version: String,
    pub latest_version: String,
}

impl UpdateCheck {
    pub fn is_outdated(&self) -> bool {
        self.installed_version != self.latest_version
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveReport {
    pub name: String,
    pub version: String,
    /// Whether the desktop config still had an entry to delete
    pub removed_from_app_config: bool,
}

/// Reconciles registry packages into the desktop config and the ledger.
pub struct Installer<'a> {
    registry: &'a dyn RegistryClient,
    app_config: &'a dyn AppConfigStore,
    ledger: &'a dyn LedgerStore,
}

impl<'a> Installer<'a> {
    pub fn new(
        registry: &'a dyn RegistryClient,
        app_config: &'a dyn AppConfigStore,
        ledger: &'a dyn LedgerStore,
    ) -> Self {
        Self {
            registry,
            app_config,
            ledger,
        }
    }

    /// Install `request.name` from the registry.
    pub fn install(&self, request: InstallRequest) -> Result<InstallReport, InstallError> {
        if let Some(existing) = self.installed(&request.name)?
            && !request.force
        {
            return Err(InstallError::AlreadyInstalled {
                name: request.name,
                version: existing.version,
            });
        }

        debug!("Resolving {}@{}", request.name, request.version);
        let descriptor = self.registry.download(&request.name, &request.version)?;

        let mut config = descriptor.install_config;
        config.merge_env(&request.env);

        self.commit(
            &request.name,
            descriptor.version,
            config,
            InstallSource::Registry,
        )
    }

    /// Install a user-authored config without consulting the registry.
    /// Always overwrites an existing entry.
    pub fn install_from_config(
        &self,
        name: &str,
        config: LaunchConfig,
    ) -> Result<InstallReport, InstallError> {
        self.commit(name, CUSTOM_VERSION.to_string(), config, InstallSource::Local)
    }

    /// Reinstall `name` at the registry's latest version if it is behind.
    ///
    /// Extra env supplied at the original install is not replayed.
    pub fn update(&self, name: &str) -> Result<UpdateOutcome, InstallError> {
        let existing = self
            .installed(name)?
            .ok_or_else(|| InstallError::NotInstalled(name.to_string()))?;
        let latest = self.latest_version(name)?;

        if existing.version == latest {
            debug!("{} is already at {}", name, latest);
            return Ok(UpdateOutcome::AlreadyLatest {
                name: name.to_string(),
                version: existing.version,
            });
        }

        let report = self.install(InstallRequest::new(name).with_force(true))?;
        Ok(UpdateOutcome::Updated {
            previous_version: existing.version,
            report,
        })
    }

    /// Update every ledger entry in name order. One failure does not stop
    /// the rest.
    pub fn update_all(&self) -> Result<BulkUpdateReport, InstallError> {
        let servers = self.installed_servers()?;
        let mut report = BulkUpdateReport::default();
        for name in servers.keys() {
            let result = self.update(name);
            if let Err(err) = &result {
                warn!("Failed to update {}: {}", name, err);
            }
            report.entries.push(BulkUpdateEntry {
                name: name.clone(),
                result,
            });
        }
        Ok(report)
    }

    /// Compare the ledger version of `name` with the registry. Never writes.
    pub fn check_update(&self, name: &str) -> Result<UpdateCheck, InstallError> {
        let existing = self
            .installed(name)?
            .ok_or_else(|| InstallError::NotInstalled(name.to_string()))?;
        let latest_version = self.latest_version(name)?;
        Ok(UpdateCheck {
            name: name.to_string(),
            installed_version: existing.version,
            latest_version,
        })
    }

    /// `check_update` for every ledger entry.
    #[allow(clippy::type_complexity)]
    pub fn check_all(
        &self,
    ) -> Result<Vec<(String, Result<UpdateCheck, InstallError>)>, InstallError> {
        let servers = self.installed_servers()?;
        Ok(servers
            .keys()
            .map(|name| (name.clone(), self.check_update(name)))
            .collect())
    }

    /// Remove `name` from the desktop config, then from the ledger.
    pub fn remove(&self, name: &str) -> Result<RemoveReport, InstallError> {
        remove_server(self.app_config, self.ledger, name)
    }

    pub fn installed(&self, name: &str) -> Result<Option<InstalledServer>, InstallError> {
        self.ledger
            .get(name)
            .map_err(|source| InstallError::ConfigReadFailed {
                store: StoreKind::Ledger,
                source,
            })
    }

    pub fn installed_servers(&self) -> Result<LedgerMap, InstallError> {
        self.ledger
            .get_all()
            .map_err(|source| InstallError::ConfigReadFailed {
                store: StoreKind::Ledger,
                source,
            })
    }

    fn latest_version(&self, name: &str) -> Result<String, InstallError> {
        let package = self.registry.get_package(name)?;
        package
            .latest_version
            .filter(|version| !version.is_empty())
            .ok_or_else(|| InstallError::NoVersionsAvailable(name.to_string()))
    }

    /// Write-through: desktop config first, then the ledger.
    fn commit(
        &self,
        name: &str,
        version: String,
        config: LaunchConfig,
        source: InstallSource,
    ) -> Result<InstallReport, InstallError> {
        let required_env = find_unresolved(&config.env);

        self.app_config
            .upsert(name, &config)
            .map_err(|source| InstallError::ConfigWriteFailed {
                store: StoreKind::AppConfig,
                source,
            })?;

        self.ledger
            .put(InstalledServer::new(
                name,
                version.clone(),
                config.clone(),
                source,
            ))
            .map_err(|source| InstallError::ConfigWriteFailed {
                store: StoreKind::Ledger,
                source,
            })?;

        info!("Installed {}@{} ({})", name, version, source);
        Ok(InstallReport {
            name: name.to_string(),
            version,
            config,
            required_env,
            source,
        })
    }
}

/// Remove a tracked server without a registry: desktop config first, then ledger.
pub fn remove_server(
    app_config: &dyn AppConfigStore,
    ledger: &dyn LedgerStore,
    name: &str,
) -> Result<RemoveReport, InstallError> {
    let existing = ledger
        .get(name)
        .map_err(|source| InstallError::ConfigReadFailed {
            store: StoreKind::Ledger,
            source,
        })?
        .ok_or_else(|| InstallError::NotInstalled(name.to_string()))?;

    let removed_from_app_config =
        app_config
            .delete(name)
            .map_err(|source| InstallError::ConfigWriteFailed {
                store: StoreKind::AppConfig,
                source,
            })?;
    if !removed_from_app_config {
        warn!("{} was tracked but missing from the desktop config", name);
    }

    ledger
        .remove(name)
        .map_err(|source| InstallError::ConfigWriteFailed {
            store: StoreKind::Ledger,
            source,
        })?;

    info!("Removed {}@{}", name, existing.version);
    Ok(RemoveReport {
        name: name.to_string(),
        version: existing.version,
        removed_from_app_config,
    })
}
