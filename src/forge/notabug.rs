//! forge::notabug
//!
//! NotaBug release adapter. HTML scraping; no API exists.
//!
//! # Design
//!
//! NotaBug offers neither a release API nor pagination, so this adapter
//! fetches the releases page:
//!
//! ```text
//! GET {host}/{namespace}/{project}/releases
//! ```
//!
//! and extracts the asset in three stages:
//!
//! 1. Build the anchor markup of the requested release's auto-generated
//!    source zip: `href="/{ns}/{proj}/archive/{release}.zip"`.
//! 2. Scan the page for `<div class="download">...</div>` blocks and take
//!    the first whose inner HTML contains the stage-1 marker. NotaBug
//!    groups each release's attachments in the same block as its source
//!    zip link, and this scoping is what ties an attachment to a release.
//! 3. Within that block, scan attachment anchors
//!    (`href="/attachments/<uuid>" ...>{filename}<`) and take the first
//!    whose displayed filename equals the requested asset.
//!
//! Skipping stage 2 and scanning the whole page for a filename match
//! would attribute assets from unrelated releases. This adapter is the
//! part of the system most exposed to upstream format drift; the layout
//! assumptions live in the two patterns below and nowhere else.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;

use super::traits::{
    ensure_success, ReleaseAssetRequest, ReleaseResolver, ResolveError, FETCH_TIMEOUT,
};

/// One download section per release. Non-greedy, spans newlines.
static DOWNLOAD_BLOCK_RX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<div class="download">(.*?)</div>"#).expect("block pattern"));

/// Attachment anchor: captures the attachment uuid and displayed filename.
static ATTACHMENT_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="/attachments/([0-9a-f-]+)"[^>]*>([^<]+)<"#).expect("attachment pattern")
});

/// NotaBug release resolver.
#[derive(Debug, Clone)]
pub struct NotaBugResolver {
    /// HTTP client for upstream fetches.
    client: Client,
    /// Base URL override for tests against a local fixture server.
    base_override: Option<String>,
}

impl NotaBugResolver {
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

impl Default for NotaBugResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReleaseResolver for NotaBugResolver {
    fn name(&self) -> &'static str {
        "notabug"
    }

    async fn resolve(&self, request: &ReleaseAssetRequest) -> Result<String, ResolveError> {
        let base = self.base(&request.host);
        let url = format!("{}/{}/{}/releases", base, request.namespace, request.project);

        let response = self
            .client
            .get(&url)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))?;
        ensure_success(response.status())?;

        let page = response
            .text()
            .await
            .map_err(|e| ResolveError::Network(e.to_string()))?;

        let marker = release_zip_marker(&request.namespace, &request.project, &request.release);
        let uuid = attachment_in_release_block(&page, &marker, &request.asset)
            .ok_or_else(|| ResolveError::AssetNotFound(request.asset.clone()))?;

        Ok(format!("{}/attachments/{}", base, uuid))
    }
}

/// The source-zip anchor markup that identifies a release's download block.
fn release_zip_marker(namespace: &str, project: &str, release: &str) -> String {
    format!(
        r#"href="/{}/{}/archive/{}.zip""#,
        namespace, project, release
    )
}

/// Find the attachment uuid for `asset` inside the download block marked
/// by `marker`.
///
/// Only the first marked block is searched; an attachment with the right
/// filename in some other release's block must not be returned.
fn attachment_in_release_block(page: &str, marker: &str, asset: &str) -> Option<String> {
    let block = DOWNLOAD_BLOCK_RX
        .captures_iter(page)
        .map(|c| c.get(1).map_or("", |m| m.as_str()))
        .find(|block| block.contains(marker))?;

    ATTACHMENT_RX
        .captures_iter(block)
        .find(|c| &c[2] == asset)
        .map(|c| c[1].to_string())
}
