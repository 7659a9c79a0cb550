//! forge::mock
//!
//! Call-recording mock resolver for deterministic testing.
//!
//! # Design
//!
//! The mock records every request it receives and answers with a canned
//! result. Tests use the call log to assert dispatch went to the right
//! adapter and, for invalid input, that no resolver ran at all (the
//! "zero fetches" property of the validation short-circuit).
//!
//! # Example
//!
//! ```
//! use forgelink::forge::mock::MockResolver;
//! use forgelink::forge::{ForgeKind, ReleaseAssetRequest, ReleaseResolver};
//!
//! # tokio_test::block_on(async {
//! let resolver = MockResolver::redirecting_to("https://x/app.apk");
//! let request = ReleaseAssetRequest::new(
//!     ForgeKind::GiteaCompatible, "ns", "proj", "v1.0", "app.apk",
//! );
//!
//! let url = resolver.resolve(&request).await.unwrap();
//! assert_eq!(url, "https://x/app.apk");
//! assert_eq!(resolver.call_count(), 1);
//! # });
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{ReleaseAssetRequest, ReleaseResolver, ResolveError};

/// Mock resolver for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share the
/// same call log, so a test can keep a handle while the resolver itself
/// is boxed into an orchestrator.
#[derive(Debug, Clone)]
pub struct MockResolver {
    inner: Arc<Mutex<MockResolverInner>>,
}

#[derive(Debug)]
struct MockResolverInner {
    /// Requests seen, in arrival order.
    calls: Vec<ReleaseAssetRequest>,
    /// Canned answer returned for every call.
    result: Result<String, ResolveError>,
}

impl MockResolver {
    /// Create a mock that reports every asset as missing.
    pub fn new() -> Self {
        Self::failing_with(ResolveError::AssetNotFound("mock".into()))
    }

    /// Create a mock that resolves every request to `url`.
    pub fn redirecting_to(url: impl Into<String>) -> Self {
        Self::with_result(Ok(url.into()))
    }

    /// Create a mock that fails every request with `error`.
    pub fn failing_with(error: ResolveError) -> Self {
        Self::with_result(Err(error))
    }

    fn with_result(result: Result<String, ResolveError>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockResolverInner {
                calls: Vec::new(),
                result,
            })),
        }
    }

    /// Number of resolve calls received so far.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// All requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<ReleaseAssetRequest> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockResolverInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReleaseResolver for MockResolver {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn resolve(&self, request: &ReleaseAssetRequest) -> Result<String, ResolveError> {
        let mut inner = self.lock();
        inner.calls.push(request.clone());
        inner.result.clone()
    }
}
