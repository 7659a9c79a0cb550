//! forge::traits
//!
//! Resolver trait definition for querying remote forges.
//!
//! # Design
//!
//! The `ReleaseResolver` trait is async because resolution involves network
//! I/O. Implementations perform exactly one upstream fetch per call, bounded
//! by [`FETCH_TIMEOUT`], with no retries: a slow or failing upstream degrades
//! to a failure code rather than blocking the client.
//!
//! Resolvers hold no cross-request state. A request produces exactly one
//! outcome and is then discarded, so concurrent resolutions need no locking.
//!
//! # Example
//!
//! ```ignore
//! use forgelink::forge::{ReleaseAssetRequest, ReleaseResolver};
//! use forgelink::forge::factory::ForgeKind;
//!
//! async fn lookup(resolver: &dyn ReleaseResolver) {
//!     let request = ReleaseAssetRequest::new(
//!         ForgeKind::GiteaCompatible, "ns", "proj", "v1.0", "app.apk",
//!     );
//!     match resolver.resolve(&request).await {
//!         Ok(url) => println!("redirect to {url}"),
//!         Err(e) => println!("failed with {}", e.status()),
//!     }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::factory::ForgeKind;

/// Upstream fetch budget. One fetch per resolution, no retries.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors from a resolution attempt.
///
/// Everything an upstream can do wrong is captured here and converted to a
/// failure code at the resolver boundary; nothing propagates to the HTTP
/// layer as an unhandled error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A path parameter failed the identifier grammar.
    #[error("invalid request parameter")]
    InvalidInput,

    /// The forge reported no such release (upstream 404).
    #[error("upstream has no such release")]
    UpstreamNotFound,

    /// The release exists but carries no matching asset.
    #[error("no asset named '{0}' in release")]
    AssetNotFound(String),

    /// The forge answered with an unexpected status.
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Timeout, connection failure, or other transport error.
    #[error("network error: {0}")]
    Network(String),

    /// The response decoded, but not into the expected shape.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl ResolveError {
    /// The client-visible failure code for this error.
    ///
    /// Upstream "release not found" and "asset not found" map to 404.
    /// Everything else, including timeouts and malformed responses, maps
    /// to 400: the upstream problem is opaque to the client and is treated
    /// like a request it cannot serve.
    pub fn status(&self) -> u16 {
        match self {
            ResolveError::UpstreamNotFound | ResolveError::AssetNotFound(_) => 404,
            ResolveError::InvalidInput
            | ResolveError::UpstreamStatus(_)
            | ResolveError::Network(_)
            | ResolveError::Malformed(_) => 400,
        }
    }
}

/// An immutable release-asset lookup request.
///
/// Invariant: the `namespace`, `project`, `release`, and `asset` fields
/// match `[A-Za-z0-9._-]+` before any resolver runs. The orchestrator
/// enforces this; resolvers may interpolate the fields into URLs and
/// search patterns without further escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAssetRequest {
    /// Which forge protocol to speak.
    pub forge: ForgeKind,
    /// Forge domain, e.g. `codeberg.org`.
    pub host: String,
    /// Owner namespace (user or organization).
    pub namespace: String,
    /// Project name.
    pub project: String,
    /// Release tag or identifier.
    pub release: String,
    /// Asset filename to resolve.
    pub asset: String,
}

impl ReleaseAssetRequest {
    /// Build a request against the forge's default public host.
    pub fn new(
        forge: ForgeKind,
        namespace: impl Into<String>,
        project: impl Into<String>,
        release: impl Into<String>,
        asset: impl Into<String>,
    ) -> Self {
        Self {
            forge,
            host: forge.default_host().to_string(),
            namespace: namespace.into(),
            project: project.into(),
            release: release.into(),
            asset: asset.into(),
        }
    }

    /// The four client-supplied path parameters, in route order.
    pub fn path_params(&self) -> [&str; 4] {
        [&self.namespace, &self.project, &self.release, &self.asset]
    }
}

/// Outcome of mapping a request to a redirect target or a failure code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Absolute URL to forward the client to.
    Redirect(String),
    /// Semantic failure; the code is the whole answer.
    Failure(u16),
}

/// A per-forge protocol adapter.
///
/// Implementations turn a validated request into one upstream query, parse
/// the forge-specific response shape, and extract the single matching asset
/// URL.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; resolutions run concurrently
/// across async tasks.
#[async_trait]
pub trait ReleaseResolver: Send + Sync {
    /// The adapter name (e.g. "gitea", "gitlab", "notabug").
    fn name(&self) -> &'static str;

    /// Resolve the request to the matching asset's download URL.
    ///
    /// # Errors
    ///
    /// - `UpstreamNotFound` if the forge reports no such release
    /// - `AssetNotFound` if the release carries no matching asset
    /// - `UpstreamStatus` for any other non-2xx upstream answer
    /// - `Network` on timeout or transport failure
    /// - `Malformed` when the response does not have the expected shape
    async fn resolve(&self, request: &ReleaseAssetRequest) -> Result<String, ResolveError>;
}

/// Map an upstream status line to the shared error taxonomy.
///
/// Returns `Ok(())` for 2xx, `UpstreamNotFound` for 404, and
/// `UpstreamStatus` for everything else. Shared by all adapters so the
/// 404 / non-404 distinction cannot drift between them.
pub(crate) fn ensure_success(status: reqwest::StatusCode) -> Result<(), ResolveError> {
    if status == reqwest::StatusCode::NOT_FOUND {
        Err(ResolveError::UpstreamNotFound)
    } else if !status.is_success() {
        Err(ResolveError::UpstreamStatus(status.as_u16()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod resolve_error {
        use super::*;

        #[test]
        fn not_found_variants_map_to_404() {
            assert_eq!(ResolveError::UpstreamNotFound.status(), 404);
            assert_eq!(ResolveError::AssetNotFound("app.apk".into()).status(), 404);
        }

        #[test]
        fn everything_else_maps_to_400() {
            assert_eq!(ResolveError::InvalidInput.status(), 400);
            assert_eq!(ResolveError::UpstreamStatus(500).status(), 400);
            assert_eq!(ResolveError::Network("timed out".into()).status(), 400);
            assert_eq!(ResolveError::Malformed("missing key".into()).status(), 400);
        }

        #[test]
        fn display() {
            assert_eq!(
                format!("{}", ResolveError::AssetNotFound("app.apk".into())),
                "no asset named 'app.apk' in release"
            );
            assert_eq!(
                format!("{}", ResolveError::UpstreamStatus(503)),
                "upstream returned status 503"
            );
        }
    }

    mod ensure_success {
        use super::*;
        use reqwest::StatusCode;

        #[test]
        fn ok_on_2xx() {
            assert_eq!(ensure_success(StatusCode::OK), Ok(()));
            assert_eq!(ensure_success(StatusCode::NO_CONTENT), Ok(()));
        }

        #[test]
        fn upstream_404_is_not_found() {
            assert_eq!(
                ensure_success(StatusCode::NOT_FOUND),
                Err(ResolveError::UpstreamNotFound)
            );
        }

        #[test]
        fn other_errors_keep_their_status() {
            assert_eq!(
                ensure_success(StatusCode::INTERNAL_SERVER_ERROR),
                Err(ResolveError::UpstreamStatus(500))
            );
            assert_eq!(
                ensure_success(StatusCode::FORBIDDEN),
                Err(ResolveError::UpstreamStatus(403))
            );
            // A 3xx that survives the client's own redirect following is
            // unexpected and treated as an upstream error.
            assert_eq!(
                ensure_success(StatusCode::MOVED_PERMANENTLY),
                Err(ResolveError::UpstreamStatus(301))
            );
        }
    }

    mod release_asset_request {
        use super::*;

        #[test]
        fn new_fills_default_host() {
            let req = ReleaseAssetRequest::new(
                ForgeKind::GiteaCompatible,
                "ns",
                "proj",
                "v1.0",
                "app.apk",
            );
            assert_eq!(req.host, "codeberg.org");
            assert_eq!(req.path_params(), ["ns", "proj", "v1.0", "app.apk"]);
        }
    }
}
