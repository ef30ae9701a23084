//! Shared core types used across the config stores, ledger and installer.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a host application launches an MCP server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Executable to run
    pub command: String,
    /// Arguments, in order
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment variables; values may be `${NAME}` placeholders
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl LaunchConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Shallow-merge `extra` over this config's env; keys in `extra` win.
    pub fn merge_env(&mut self, extra: &BTreeMap<String, String>) {
        for (key, value) in extra {
            self.env.insert(key.clone(), value.clone());
        }
    }

    /// Command line as a single display string.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Where an installed server came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallSource {
    /// Downloaded descriptor from the registry
    Registry,
    /// User-authored launch config
    Local,
    /// Reserved for source-control references
    Github,
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InstallSource::Registry => "registry",
            InstallSource::Local => "local",
            InstallSource::Github => "github",
        };
        f.write_str(label)
    }
}

/// One entry in the installation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledServer {
    pub name: String,
    pub version: String,
    /// Config as installed; placeholders are kept, not resolved.
    pub config: LaunchConfig,
    pub installed_at: DateTime<Utc>,
    pub source: InstallSource,
}

impl InstalledServer {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        config: LaunchConfig,
        source: InstallSource,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            config,
            installed_at: Utc::now(),
            source,
        }
    }
}
