//! Installation ledger: mcp-get's own record of installed servers.
//!
//! The ledger is independent of the desktop config. Each operation loads the
//! whole map, modifies it and saves it back.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::SettingsStore;
use crate::types::InstalledServer;

pub type LedgerMap = BTreeMap<String, InstalledServer>;

/// Persistent map of installed servers keyed by name.
pub trait LedgerStore {
    /// Whole ledger; an absent record is an empty map.
    fn load_servers(&self) -> anyhow::Result<LedgerMap>;

    /// Replace the whole ledger.
    fn save_servers(&self, servers: &LedgerMap) -> anyhow::Result<()>;

    fn get_all(&self) -> anyhow::Result<LedgerMap> {
        self.load_servers()
    }

    fn get(&self, name: &str) -> anyhow::Result<Option<InstalledServer>> {
        Ok(self.load_servers()?.remove(name))
    }

    /// Insert or overwrite by name.
    fn put(&self, server: InstalledServer) -> anyhow::Result<()> {
        let mut servers = self.load_servers()?;
        servers.insert(server.name.clone(), server);
        self.save_servers(&servers)
    }

    /// Delete by name; absent names are a no-op.
    fn remove(&self, name: &str) -> anyhow::Result<()> {
        let mut servers = self.load_servers()?;
        if servers.remove(name).is_none() {
            return Ok(());
        }
        self.save_servers(&servers)
    }
}

impl LedgerStore for SettingsStore {
    fn load_servers(&self) -> anyhow::Result<LedgerMap> {
        let servers = self.load()?.installed_servers;
        debug!("Ledger has {} server(s)", servers.len());
        Ok(servers)
    }

    fn save_servers(&self, servers: &LedgerMap) -> anyhow::Result<()> {
        let servers = servers.clone();
        let count = servers.len();
        self.update(|settings| settings.installed_servers = servers)?;
        info!("Saved ledger with {} server(s)", count);
        Ok(())
    }
}
