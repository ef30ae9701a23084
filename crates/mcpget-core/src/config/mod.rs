//! Configuration stores
//!
//! - `desktop`: the host application's `claude_desktop_config.json`
//! - `settings`: mcp-get's own settings record, which also holds the ledger
//! - `paths`: platform default locations for both files

pub mod desktop;
pub mod paths;
pub mod settings;

pub use desktop::{AppConfigStore, DesktopConfigFile, DesktopServerEntry, SERVERS_KEY, ServerMap};
pub use paths::{default_desktop_config_path, default_settings_path, platform_name};
pub use settings::{DEFAULT_API_URL, Settings, SettingsStore};
