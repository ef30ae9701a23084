//! HTTP client for the registry API (`{api_url}/api/v1`).
//!
//! Responses are JSON envelopes `{data?, error?, message?, pagination?}`.
//! Requests run on a private current-thread tokio runtime so the rest of the
//! crate stays synchronous. No timeout is set.

use anyhow::Context;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{
    DownloadDescriptor, ListQuery, PackageInfo, Pagination, RegistryCatalog, RegistryClient,
    RegistryError, SearchResults,
};

const CLIENT_NAME: &str = "mcp-get";
const USER_AGENT: &str = concat!("mcp-get/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    fn into_data(self, fallback: impl FnOnce() -> String) -> Result<T, RegistryError> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(RegistryError::Request(
                self.message.or(self.error).unwrap_or_else(fallback),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Registry client over HTTP.
#[derive(Debug)]
pub struct HttpRegistryClient {
    base_url: Url,
    token: Option<String>,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpRegistryClient {
    /// Client for `api_url`; `token` is sent as a bearer token when present.
    pub fn new(api_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(api_url).with_context(|| format!("Invalid registry URL: {}", api_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Invalid registry URL: {}", api_url);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        Ok(Self {
            base_url,
            token: token.filter(|t| !t.is_empty()),
            client,
            runtime,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Envelope<T>, RegistryError> {
        self.runtime.block_on(self.fetch(url))
    }

    async fn fetch<T: DeserializeOwned>(&self, url: Url) -> Result<Envelope<T>, RegistryError> {
        debug!("GET {}", url);
        let mut request = self
            .client
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header("X-Client", CLIENT_NAME);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| RegistryError::Request(err.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RegistryError::Request(err.to_string()))?;

        parse_envelope(status, &body)
    }
}

impl RegistryClient for HttpRegistryClient {
    fn get_package(&self, name: &str) -> Result<PackageInfo, RegistryError> {
        let url = endpoint_url(&self.base_url, &["mcp", name]);
        self.get::<PackageInfo>(url)?
            .into_data(|| format!("MCP server '{}' not found", name))
    }

    fn download(&self, name: &str, version: &str) -> Result<DownloadDescriptor, RegistryError> {
        let url = endpoint_url(
            &self.base_url,
            &["mcp", name, "versions", version, "download"],
        );
        self.get::<DownloadDescriptor>(url)?
            .into_data(|| format!("Failed to fetch MCP server: {}", name))
    }
}

impl RegistryCatalog for HttpRegistryClient {
    fn search(
        &self,
        query: &str,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<SearchResults, RegistryError> {
        let mut params = vec![("q", query.to_string()), ("type", "mcp".to_string())];
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        let url = with_query(endpoint_url(&self.base_url, &["search"]), &params);
        let envelope = self.get::<Vec<PackageInfo>>(url)?;
        Ok(SearchResults {
            data: envelope.data.unwrap_or_default(),
            pagination: envelope.pagination.unwrap_or_default(),
        })
    }

    fn list_packages(&self, query: &ListQuery) -> Result<SearchResults, RegistryError> {
        let url = with_query(endpoint_url(&self.base_url, &["mcp"]), &list_params(query));
        let envelope = self.get::<Vec<PackageInfo>>(url)?;
        Ok(SearchResults {
            data: envelope.data.unwrap_or_default(),
            pagination: envelope.pagination.unwrap_or_default(),
        })
    }
}

/// `{base}/api/v1/{segments...}` with each segment percent-encoded.
fn endpoint_url(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(["api", "v1"]).extend(segments);
    }
    url
}

fn with_query(mut url: Url, params: &[(&str, String)]) -> Url {
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    url
}

fn list_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
        params.push(("search", search.to_string()));
    }
    if let Some(category) = query.category.as_deref().filter(|s| !s.is_empty()) {
        params.push(("category", category.to_string()));
    }
    if let Some(sort) = query.sort.as_deref().filter(|s| !s.is_empty()) {
        params.push(("sort", sort.to_string()));
    }
    if let Some(page) = query.page {
        params.push(("page", page.to_string()));
    }
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<Envelope<T>, RegistryError> {
    if !status.is_success() {
        let error: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
        let message = error
            .message
            .or(error.error)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        return Err(if status == StatusCode::NOT_FOUND {
            RegistryError::NotFound(message)
        } else {
            RegistryError::Request(message)
        });
    }

    serde_json::from_slice(body)
        .map_err(|err| RegistryError::Request(format!("Invalid response from registry: {}", err)))
}
