//! resolver
//!
//! Resolution orchestrator.
//!
//! # Design
//!
//! [`Resolvers`] owns one adapter per forge kind and is the only place
//! where forge selection occurs. `resolve` runs the pipeline:
//!
//! 1. Validate the four client-supplied path parameters; any failure
//!    short-circuits to `Failure(400)` before any network call.
//! 2. Dispatch to the adapter matching the request's forge kind.
//! 3. Normalize the adapter's outcome into a [`Resolution`].
//!
//! The orchestrator is stateless: concurrent resolutions share nothing
//! mutable and repeated resolution of the same request against a fixed
//! upstream yields the same `Resolution`.

use crate::forge::{create_resolver, ForgeKind, ReleaseAssetRequest, ReleaseResolver, Resolution};
use crate::validate::valid_segments;

/// The set of per-forge adapters, one per [`ForgeKind`].
pub struct Resolvers {
    gitea: Box<dyn ReleaseResolver>,
    gitlab: Box<dyn ReleaseResolver>,
    notabug: Box<dyn ReleaseResolver>,
}

impl Resolvers {
    /// Build the production adapter set.
    pub fn new() -> Self {
        Self {
            gitea: create_resolver(ForgeKind::GiteaCompatible),
            gitlab: create_resolver(ForgeKind::GitLab),
            notabug: create_resolver(ForgeKind::NotaBug),
        }
    }

    /// Build an adapter set from explicit resolvers.
    ///
    /// Used by tests to substitute mocks or fixture-pinned adapters.
    pub fn custom(
        gitea: Box<dyn ReleaseResolver>,
        gitlab: Box<dyn ReleaseResolver>,
        notabug: Box<dyn ReleaseResolver>,
    ) -> Self {
        Self {
            gitea,
            gitlab,
            notabug,
        }
    }

    fn resolver_for(&self, kind: ForgeKind) -> &dyn ReleaseResolver {
        match kind {
            ForgeKind::GiteaCompatible => self.gitea.as_ref(),
            ForgeKind::GitLab => self.gitlab.as_ref(),
            ForgeKind::NotaBug => self.notabug.as_ref(),
        }
    }

    /// Resolve a request to a redirect target or a failure code.
    ///
    /// Never returns an error: every upstream or input problem is folded
    /// into `Resolution::Failure` here, at the resolver boundary.
    pub async fn resolve(&self, request: &ReleaseAssetRequest) -> Resolution {
        if !valid_segments(&request.path_params()) {
            tracing::debug!(forge = %request.forge, "rejected request with invalid parameter");
            return Resolution::Failure(400);
        }

        let resolver = self.resolver_for(request.forge);
        match resolver.resolve(request).await {
            Ok(url) => {
                tracing::debug!(forge = %request.forge, url = %url, "resolved asset");
                Resolution::Redirect(url)
            }
            Err(e) => {
                tracing::debug!(
                    forge = %request.forge,
                    error = %e,
                    status = e.status(),
                    "resolution failed"
                );
                Resolution::Failure(e.status())
            }
        }
    }
}

impl Default for Resolvers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::MockResolver;
    use crate::forge::ResolveError;

    fn mocked() -> (Resolvers, MockResolver, MockResolver, MockResolver) {
        let gitea = MockResolver::redirecting_to("https://codeberg.org/a");
        let gitlab = MockResolver::redirecting_to("https://gitlab.com/a");
        let notabug = MockResolver::redirecting_to("https://notabug.org/a");
        let resolvers = Resolvers::custom(
            Box::new(gitea.clone()),
            Box::new(gitlab.clone()),
            Box::new(notabug.clone()),
        );
        (resolvers, gitea, gitlab, notabug)
    }

    #[tokio::test]
    async fn dispatches_on_forge_kind() {
        let (resolvers, gitea, gitlab, notabug) = mocked();

        let request = ReleaseAssetRequest::new(ForgeKind::GitLab, "ns", "p", "v1", "a.apk");
        let resolution = resolvers.resolve(&request).await;

        assert_eq!(
            resolution,
            Resolution::Redirect("https://gitlab.com/a".into())
        );
        assert_eq!(gitea.call_count(), 0);
        assert_eq!(gitlab.call_count(), 1);
        assert_eq!(notabug.call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_parameter_short_circuits_without_any_resolver_call() {
        let (resolvers, gitea, gitlab, notabug) = mocked();

        for bad in ["../up", "a b", "", "a%2fb", "a?x=1"] {
            let request =
                ReleaseAssetRequest::new(ForgeKind::GiteaCompatible, "ns", "p", "v1", bad);
            assert_eq!(resolvers.resolve(&request).await, Resolution::Failure(400));
        }
        // Each of the four parameters is checked, not just the asset.
        for request in [
            ReleaseAssetRequest::new(ForgeKind::NotaBug, "n/s", "p", "v1", "a.apk"),
            ReleaseAssetRequest::new(ForgeKind::NotaBug, "ns", "p p", "v1", "a.apk"),
            ReleaseAssetRequest::new(ForgeKind::NotaBug, "ns", "p", "", "a.apk"),
        ] {
            assert_eq!(resolvers.resolve(&request).await, Resolution::Failure(400));
        }

        assert_eq!(gitea.call_count(), 0);
        assert_eq!(gitlab.call_count(), 0);
        assert_eq!(notabug.call_count(), 0);
    }

    #[tokio::test]
    async fn adapter_errors_become_failure_codes() {
        let cases = [
            (ResolveError::UpstreamNotFound, 404),
            (ResolveError::AssetNotFound("a.apk".into()), 404),
            (ResolveError::UpstreamStatus(500), 400),
            (ResolveError::Network("timed out".into()), 400),
            (ResolveError::Malformed("bad json".into()), 400),
        ];
        for (error, expected) in cases {
            let resolvers = Resolvers::custom(
                Box::new(MockResolver::failing_with(error)),
                Box::new(MockResolver::new()),
                Box::new(MockResolver::new()),
            );
            let request =
                ReleaseAssetRequest::new(ForgeKind::GiteaCompatible, "ns", "p", "v1", "a.apk");
            assert_eq!(
                resolvers.resolve(&request).await,
                Resolution::Failure(expected)
            );
        }
    }

    #[tokio::test]
    async fn resolution_is_idempotent() {
        let (resolvers, _, _, notabug) = mocked();
        let request = ReleaseAssetRequest::new(ForgeKind::NotaBug, "ns", "p", "v1", "a.apk");

        let first = resolvers.resolve(&request).await;
        let second = resolvers.resolve(&request).await;

        assert_eq!(first, second);
        assert_eq!(notabug.call_count(), 2);
    }
}
