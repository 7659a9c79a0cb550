//! forge::gitlab
//!
//! GitLab release adapter.
//!
//! # Design
//!
//! GitLab exposes a JSON release API:
//!
//! ```text
//! GET {host}/api/v4/projects/{namespace}%2F{project}/releases/{release}
//! ```
//!
//! The path-encoded `%2F` selects the project by full path. The response
//! carries structured asset links under `assets.links`, plus a free-text
//! Markdown `description`.
//!
//! Resolution is two-stage, first match wins:
//!
//! 1. Scan `assets.links` for a `url` ending with `/{asset}`.
//! 2. Scan `description` for `(/uploads/<32-hex-digest>/<filename>)`
//!    markdown link targets and rebuild the upload URL for a matching
//!    filename.
//!
//! Stage 2 exists because GitLab releases frequently attach files only as
//! Markdown links in the description; the API never lists those as
//! first-class assets, so textual extraction is the only way to resolve
//! them. Structured links always take priority when both stages match.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use super::traits::{
    ensure_success, ReleaseAssetRequest, ReleaseResolver, ResolveError, FETCH_TIMEOUT,
};

/// Markdown link target of an uploaded file: `(/uploads/<digest>/<file>)`.
/// The capture is `<digest>/<file>` in one piece, ready for URL rebuild.
static UPLOAD_RX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(/uploads/([0-9a-f]{32}/[^/)]+)\)").expect("upload pattern"));

/// GitLab release resolver.
#[derive(Debug, Clone)]
pub struct GitLabResolver {
    /// HTTP client for upstream fetches.
    client: Client,
    /// Base URL override for tests against a local fixture server.
    base_override: Option<String>,
}

impl GitLabResolver {
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

impl Default for GitLabResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReleaseResolver for GitLabResolver {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn resolve(&self, request: &ReleaseAssetRequest) -> Result<String, ResolveError> {
        let base = self.base(&request.host);
        // Literal %2F: the project is addressed by its URL-encoded full
        // path. Safe to interpolate because both fields are pre-validated.
        let url = format!(
            "{}/api/v4/projects/{}%2F{}/releases/{}",
            base, request.namespace, request.project, request.release
        );

        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))?;
        ensure_success(response.status())?;

        let release: GitLabRelease = response
            .json()
            .await
            .map_err(|e| ResolveError::Malformed(e.to_string()))?;

        // Stage 1: structured asset links.
        let suffix = format!("/{}", request.asset);
        if let Some(link) = release
            .assets
            .links
            .into_iter()
            .find(|l| l.url.ends_with(&suffix))
        {
            return Ok(link.url);
        }

        // Stage 2: uploads embedded in the markdown description.
        if let Some(upload) = upload_from_description(&release.description, &request.asset) {
            return Ok(format!(
                "{}/{}/{}/uploads/{}",
                base, request.namespace, request.project, upload
            ));
        }

        Err(ResolveError::AssetNotFound(request.asset.clone()))
    }
}

/// Find the first `<digest>/<filename>` upload in a release description
/// whose filename equals `asset`.
fn upload_from_description(description: &str, asset: &str) -> Option<String> {
    let suffix = format!("/{}", asset);
    UPLOAD_RX
        .captures_iter(description)
        .map(|c| c[1].to_string())
        .find(|upload| upload.ends_with(&suffix))
}

/// Release response shape, reduced to the fields resolution needs.
///
/// Both `assets` and `description` are required: an answer without them
/// does not look like a GitLab release and is treated as malformed.
#[derive(Deserialize)]
struct GitLabRelease {
    assets: GitLabAssets,
    description: String,
}

/// Structured asset container.
#[derive(Deserialize)]
struct GitLabAssets {
    links: Vec<GitLabAssetLink>,
}

/// One structured asset link.
#[derive(Deserialize)]
struct GitLabAssetLink {
    url: String,
}
