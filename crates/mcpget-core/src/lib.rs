//! mcp-get core library
//!
//! Installs MCP servers from a registry into a desktop application's
//! launch configuration and keeps a ledger of what it installed.

pub mod config;
pub mod context;
pub mod env;
pub mod install;
pub mod ledger;
pub mod registry;
pub mod status;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{AppConfigStore, DesktopConfigFile, Settings, SettingsStore};
    pub use crate::context::AppContext;

    // Ledger
    pub use crate::ledger::{LedgerMap, LedgerStore};

    // Install
    pub use crate::install::{
        InstallError, InstallReport, InstallRequest, Installer, PackageSpec, UpdateOutcome,
    };

    // Registry
    pub use crate::registry::{
        HttpRegistryClient, PackageInfo, RegistryCatalog, RegistryClient, RegistryError,
    };

    // Status
    pub use crate::status::{DriftState, StatusReport, collect_status};

    // Types
    pub use crate::types::{InstallSource, InstalledServer, LaunchConfig};
}
