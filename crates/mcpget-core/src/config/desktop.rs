//! Claude Desktop configuration file (`claude_desktop_config.json`).
//!
//! The host application reads `mcpServers` from this file at startup. A missing
//! or unparseable file reads as "no servers configured"; writes replace the
//! whole file, so entries added by hand survive only because every write starts
//! from a fresh read. Entries that do not parse as a server entry are invisible
//! to `read` but are carried over by `write` unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::types::LaunchConfig;

/// Top-level key holding the server map.
pub const SERVERS_KEY: &str = "mcpServers";

/// One entry under `mcpServers`.
///
/// `args` and `env` are left out of the file when empty. Fields this tool does
/// not know about are kept in `extra` so they round-trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesktopServerEntry {
    #[serde(default)]
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DesktopServerEntry {
    pub fn to_launch_config(&self) -> LaunchConfig {
        LaunchConfig {
            command: self.command.clone(),
            args: self.args.clone().unwrap_or_default(),
            env: self.env.clone().unwrap_or_default(),
        }
    }
}

impl From<&LaunchConfig> for DesktopServerEntry {
    fn from(config: &LaunchConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: (!config.args.is_empty()).then(|| config.args.clone()),
            env: (!config.env.is_empty()).then(|| config.env.clone()),
            extra: Map::new(),
        }
    }
}

pub type ServerMap = BTreeMap<String, DesktopServerEntry>;

/// Read/write access to the host application's server map.
///
/// Implementors provide whole-map `read` and `write`; the entry-level
/// operations are read-modify-write on top of them with no locking, so
/// concurrent writers race and the last one wins.
pub trait AppConfigStore {
    /// Current server map. Never fails: missing or corrupt config is empty.
    fn read(&self) -> ServerMap;

    /// Replace the persisted server map.
    fn write(&self, servers: &ServerMap) -> anyhow::Result<()>;

    /// Insert or replace the entry for `name`.
    fn upsert(&self, name: &str, config: &LaunchConfig) -> anyhow::Result<()> {
        let mut servers = self.read();
        servers.insert(name.to_string(), DesktopServerEntry::from(config));
        self.write(&servers)
    }

    /// Remove the entry for `name`, returning whether it existed.
    fn delete(&self, name: &str) -> anyhow::Result<bool> {
        let mut servers = self.read();
        if servers.remove(name).is_none() {
            return Ok(false);
        }
        self.write(&servers)?;
        Ok(true)
    }

    fn get(&self, name: &str) -> Option<LaunchConfig> {
        self.read().get(name).map(DesktopServerEntry::to_launch_config)
    }

    fn list(&self) -> Vec<(String, LaunchConfig)> {
        self.read()
            .into_iter()
            .map(|(name, entry)| {
                let config = entry.to_launch_config();
                (name, config)
            })
            .collect()
    }
}

/// `AppConfigStore` backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct DesktopConfigFile {
    path: PathBuf,
}

impl DesktopConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load_root(&self) -> Map<String, Value> {
        if !self.path.exists() {
            return Map::new();
        }
        match load_json_map(&self.path) {
            Ok(root) => root,
            Err(err) => {
                warn!(
                    "Ignoring unreadable desktop config {}: {:#}",
                    self.path.display(),
                    err
                );
                Map::new()
            }
        }
    }
}

impl AppConfigStore for DesktopConfigFile {
    fn read(&self) -> ServerMap {
        let root = self.load_root();
        let Some(Value::Object(entries)) = root.get(SERVERS_KEY) else {
            return ServerMap::new();
        };

        let mut servers = ServerMap::new();
        for (name, value) in entries {
            match serde_json::from_value::<DesktopServerEntry>(value.clone()) {
                Ok(entry) => {
                    servers.insert(name.clone(), entry);
                }
                Err(err) => warn!("Skipping malformed server entry '{}': {}", name, err),
            }
        }
        debug!(
            "Read {} server(s) from {}",
            servers.len(),
            self.path.display()
        );
        servers
    }

    fn write(&self, servers: &ServerMap) -> anyhow::Result<()> {
        let mut root = self.load_root();
        let mut entries = match root.remove(SERVERS_KEY) {
            Some(Value::Object(entries)) => entries,
            _ => Map::new(),
        };
        // Keep only what `read` could not parse; everything else comes from `servers`.
        entries.retain(|name, value| {
            !servers.contains_key(name)
                && serde_json::from_value::<DesktopServerEntry>(value.clone()).is_err()
        });
        for (name, entry) in servers {
            let value = serde_json::to_value(entry)
                .with_context(|| format!("Failed to serialize server entry '{}'", name))?;
            entries.insert(name.clone(), value);
        }
        root.insert(SERVERS_KEY.to_string(), Value::Object(entries));
        write_json_map(&self.path, &root)?;
        info!(
            "Wrote {} server(s) to {}",
            servers.len(),
            self.path.display()
        );
        Ok(())
    }
}

fn load_json_map(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let value: Value =
        serde_json::from_slice(&bytes).with_context(|| "Failed to parse JSON config")?;
    match value {
        Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Expected JSON object at root: {}", path.display()),
    }
}

fn write_json_map(path: &Path, map: &Map<String, Value>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    let bytes = serde_json::to_vec_pretty(map).context("Failed to serialize JSON config")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}
