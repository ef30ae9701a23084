//! Registry API types and client traits.
//!
//! The installer only needs [`RegistryClient`]; the CLI's search and browse
//! commands use [`RegistryCatalog`]. Both are implemented over HTTP by
//! [`HttpRegistryClient`].

pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::LaunchConfig;

pub use http::HttpRegistryClient;

/// Failure talking to the registry. Transport errors and non-2xx responses
/// both end up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Request(String),
}

impl RegistryError {
    pub fn message(&self) -> &str {
        match self {
            RegistryError::NotFound(message) | RegistryError::Request(message) => message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageAuthor {
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub trust_tier: Option<String>,
}

/// Package metadata as published in the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<PackageAuthor>,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rating_count: u64,
    /// `None` when no version has been published
    #[serde(default)]
    pub latest_version: Option<String>,
}

/// How to run one resolved version of a package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadDescriptor {
    /// Concrete version ("latest" resolved)
    pub version: String,
    #[serde(default)]
    pub repository: Option<String>,
    #[serde(default)]
    pub readme: Option<String>,
    pub install_config: LaunchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total: 0,
            page: 1,
            limit: 20,
            has_more: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub data: Vec<PackageInfo>,
    pub pagination: Pagination,
}

impl SearchResults {
    /// Keep only featured packages. Pagination still describes the full page.
    pub fn retain_featured(&mut self) {
        self.data.retain(|package| package.featured);
    }
}

/// Filters for browsing the registry.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Package resolution used by the installer.
pub trait RegistryClient {
    /// Metadata for `name`, including its latest published version.
    fn get_package(&self, name: &str) -> Result<PackageInfo, RegistryError>;

    /// Resolve `version` ("latest" or exact) to a download descriptor.
    fn download(&self, name: &str, version: &str) -> Result<DownloadDescriptor, RegistryError>;
}

/// Discovery endpoints.
pub trait RegistryCatalog {
    fn search(
        &self,
        query: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<SearchResults, RegistryError>;

    fn list_packages(&self, query: &ListQuery) -> Result<SearchResults, RegistryError>;
}
