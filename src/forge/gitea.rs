//! forge::gitea
//!
//! Gitea-compatible release adapter.
//!
//! # Design
//!
//! Gitea (and Forgejo, which Codeberg runs) exposes a JSON release API:
//!
//! ```text
//! GET {host}/api/v1/repos/{namespace}/{project}/releases/tags/{tag}
//! ```
//!
//! The response carries an `assets` list with `name` and
//! `browser_download_url` per entry. Resolution scans the list in response
//! order and returns the first entry whose name equals the requested asset.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::traits::{
    ensure_success, ReleaseAssetRequest, ReleaseResolver, ResolveError, FETCH_TIMEOUT,
};

/// Gitea-compatible release resolver.
#[derive(Debug, Clone)]
pub struct GiteaResolver {
    /// HTTP client for upstream fetches.
    client: Client,
    /// Base URL override for tests against a local fixture server.
    base_override: Option<String>,
}

impl GiteaResolver {
    /// Create a resolver that talks to `https://{request.host}`.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_override: None,
        }
    }

    /// Create a resolver pinned to a custom base URL.
    ///
    /// The request's `host` field is ignored. Used by tests to point the
    /// adapter at a mock upstream.
    pub fn with_base_url(base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_override: Some(base.into()),
        }
    }

    fn base(&self, host: &str) -> String {
        match &self.base_override {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("https://{}", host),
        }
    }
}

impl Default for GiteaResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReleaseResolver for GiteaResolver {
    fn name(&self) -> &'static str {
        "gitea"
    }

    async fn resolve(&self, request: &ReleaseAssetRequest) -> Result<String, ResolveError> {
        let url = format!(
            "{}/api/v1/repos/{}/{}/releases/tags/{}",
            self.base(&request.host),
            request.namespace,
            request.project,
            request.release
        );

        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))?;
        ensure_success(response.status())?;

        let release: GiteaRelease = response
            .json()
            .await
            .map_err(|e| ResolveError::Malformed(e.to_string()))?;

        release
            .assets
            .into_iter()
            .find(|a| a.name == request.asset)
            .map(|a| a.browser_download_url)
            .ok_or_else(|| ResolveError::AssetNotFound(request.asset.clone()))
    }
}

/// Release response shape, reduced to the fields resolution needs.
#[derive(Deserialize)]
struct GiteaRelease {
    assets: Vec<GiteaAsset>,
}

/// One downloadable asset attached to a release.
#[derive(Deserialize)]
struct GiteaAsset {
    name: String,
    browser_download_url: String,
}
