//! Drift report between the installation ledger and the desktop config.
//!
//! The report is read-only. It never repairs drift; re-running `install` or
//! `remove` for a name is how the two stores are brought back in line.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::AppConfigStore;
use crate::env::{find_unresolved_with, process_lookup, resolve_placeholders_with};
use crate::ledger::LedgerStore;
use crate::types::{InstallSource, LaunchConfig};

// =============================================================================
// Data Structures
// =============================================================================

/// Drift state of one server name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftState {
    /// both stores have it with equivalent launch configs
    InSync,
    /// both stores have it, launch configs differ
    ConfigMismatch,
    /// tracked in the ledger but gone from the desktop config
    MissingFromAppConfig,
    /// present in the desktop config only
    Untracked,
}

impl DriftState {
    pub fn is_drift(self) -> bool {
        self != DriftState::InSync
    }

    pub fn label(self) -> &'static str {
        match self {
            DriftState::InSync => "in sync",
            DriftState::ConfigMismatch => "config differs",
            DriftState::MissingFromAppConfig => "missing from desktop config",
            DriftState::Untracked => "not installed by mcp-get",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub name: String,
    pub state: DriftState,
    /// `None` for untracked entries
    pub version: Option<String>,
    pub source: Option<InstallSource>,
    /// Placeholders in the ledger config with no value right now
    pub required_env: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub tracked: usize,
    pub in_sync: usize,
    pub drifted: usize,
    pub untracked: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub servers: Vec<ServerStatus>,
    pub summary: StatusSummary,
}

impl StatusReport {
    pub fn has_drift(&self) -> bool {
        self.servers.iter().any(|s| s.state.is_drift())
    }
}

// =============================================================================
// Core Functions
// =============================================================================

/// Compare both stores, resolving placeholders from the process environment.
pub fn collect_status(
    app_config: &dyn AppConfigStore,
    ledger: &dyn LedgerStore,
) -> anyhow::Result<StatusReport> {
    collect_status_with(app_config, ledger, process_lookup)
}

/// Compare both stores, resolving placeholders with `lookup`.
pub fn collect_status_with<F>(
    app_config: &dyn AppConfigStore,
    ledger: &dyn LedgerStore,
    lookup: F,
) -> anyhow::Result<StatusReport>
where
    F: Fn(&str) -> Option<String>,
{
    let tracked = ledger.get_all()?;
    let deployed = app_config.read();

    let names: BTreeSet<&String> = tracked.keys().chain(deployed.keys()).collect();
    let mut report = StatusReport::default();

    for name in names {
        let desktop = deployed.get(name).map(|entry| entry.to_launch_config());
        let status = match tracked.get(name) {
            Some(server) => ServerStatus {
                name: name.clone(),
                state: match &desktop {
                    Some(config) => determine_state(&server.config, config, &lookup),
                    None => DriftState::MissingFromAppConfig,
                },
                version: Some(server.version.clone()),
                source: Some(server.source),
                required_env: find_unresolved_with(&server.config.env, &lookup),
            },
            None => ServerStatus {
                name: name.clone(),
                state: DriftState::Untracked,
                version: None,
                source: None,
                required_env: Vec::new(),
            },
        };
        report.servers.push(status);
    }

    report.summary = summarize(&report.servers);
    Ok(report)
}

/// State of a name both stores know about.
///
/// Configs are equal if they match as stored, or after placeholders on both
/// sides are resolved. The second case covers a user who pasted real values
/// over the placeholders in the desktop config.
pub fn determine_state<F>(tracked: &LaunchConfig, deployed: &LaunchConfig, lookup: F) -> DriftState
where
    F: Fn(&str) -> Option<String>,
{
    if tracked == deployed || resolved(tracked, &lookup) == resolved(deployed, &lookup) {
        DriftState::InSync
    } else {
        DriftState::ConfigMismatch
    }
}

fn resolved<F>(config: &LaunchConfig, lookup: F) -> LaunchConfig
where
    F: Fn(&str) -> Option<String>,
{
    LaunchConfig {
        command: config.command.clone(),
        args: config.args.clone(),
        env: resolve_placeholders_with(&config.env, lookup),
    }
}

fn summarize(servers: &[ServerStatus]) -> StatusSummary {
    let mut summary = StatusSummary::default();
    for server in servers {
        match server.state {
            DriftState::InSync => summary.in_sync += 1,
            DriftState::ConfigMismatch | DriftState::MissingFromAppConfig => summary.drifted += 1,
            DriftState::Untracked => summary.untracked += 1,
        }
        if server.state != DriftState::Untracked {
            summary.tracked += 1;
        }
    }
    summary
}
