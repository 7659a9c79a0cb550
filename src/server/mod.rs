//! server
//!
//! HTTP boundary: routes, responses, rate limiting, client addressing.
//!
//! # Responsibilities
//!
//! - Map `GET /{forge}/{namespace}/{project}/{release}/{asset}` onto the
//!   orchestrator and turn its [`Resolution`] into a 302 redirect or a
//!   bare failure status
//! - Answer `/` with a redirect to the project homepage and `/robots.txt`
//!   with a crawl-everything-off policy
//! - Enforce per-client quotas on the forge routes only
//!
//! The server layer holds no resolution logic; everything upstream-facing
//! lives behind [`crate::resolver::Resolvers`], which keeps this layer a
//! thin translation between HTTP and the resolution contract.

pub mod addr;
pub mod limit;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::forge::{ForgeKind, ReleaseAssetRequest, Resolution};
use crate::resolver::Resolvers;
use limit::RouteLimiters;

/// Where `GET /` points people.
const HOMEPAGE: &str = "https://github.com/forgelink/forgelink";

/// Static `robots.txt` body: this service exists for package managers,
/// not crawlers.
const ROBOTS_TXT: &str = "User-agent: *\nDisallow: /\n";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The per-forge adapter set.
    pub resolvers: Arc<Resolvers>,
    /// Process configuration.
    pub config: Arc<Config>,
    /// One quota counter per forge route.
    pub limiters: Arc<RouteLimiters>,
}

impl AppState {
    /// Build state with production resolvers.
    pub fn new(config: Config) -> Self {
        Self::with_resolvers(config, Resolvers::new())
    }

    /// Build state with an explicit resolver set (tests).
    pub fn with_resolvers(config: Config, resolvers: Resolvers) -> Self {
        let limiters = if config.ratelimit {
            RouteLimiters::enforcing()
        } else {
            RouteLimiters::disabled()
        };
        Self {
            resolvers: Arc::new(resolvers),
            config: Arc::new(config),
            limiters: Arc::new(limiters),
        }
    }
}

/// Build the full application router.
///
/// The forge routes sit behind their rate-limit middleware; `/` and
/// `/robots.txt` are exempt. The panic-recovery layer is the 500
/// last-resort: resolution itself only ever produces 302, 400, or 404.
pub fn build_router(state: AppState) -> Router {
    let codeberg_routes = Router::new()
        .route(
            "/codeberg/{namespace}/{project}/{release}/{asset}",
            get(codeberg),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limit::enforce_codeberg,
        ));

    let gitlab_routes = Router::new()
        .route(
            "/gitlab/{namespace}/{project}/{release}/{asset}",
            get(gitlab),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limit::enforce_gitlab,
        ));

    let notabug_routes = Router::new()
        .route(
            "/notabug/{namespace}/{project}/{release}/{asset}",
            get(notabug),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            limit::enforce_notabug,
        ));

    Router::new()
        .route("/", get(home))
        .route("/robots.txt", get(robots))
        .merge(codeberg_routes)
        .merge(gitlab_routes)
        .merge(notabug_routes)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn codeberg(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
) -> Response {
    resolve_route(&state, ForgeKind::GiteaCompatible, params).await
}

async fn gitlab(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
) -> Response {
    resolve_route(&state, ForgeKind::GitLab, params).await
}

async fn notabug(
    State(state): State<AppState>,
    Path(params): Path<(String, String, String, String)>,
) -> Response {
    resolve_route(&state, ForgeKind::NotaBug, params).await
}

async fn resolve_route(
    state: &AppState,
    forge: ForgeKind,
    (namespace, project, release, asset): (String, String, String, String),
) -> Response {
    let request = ReleaseAssetRequest::new(forge, namespace, project, release, asset);
    match state.resolvers.resolve(&request).await {
        Resolution::Redirect(url) => found(&url),
        Resolution::Failure(code) => StatusCode::from_u16(code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            .into_response(),
    }
}

async fn home() -> Response {
    found(HOMEPAGE)
}

async fn robots() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        ROBOTS_TXT,
    )
        .into_response()
}

/// A 302 Found redirect. Package managers historically expect 302 here,
/// so the axum 303/307 helpers are not used.
fn found(location: &str) -> Response {
    match header::HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        // Resolved URLs come from upstream JSON/HTML; one that is not a
        // legal header value cannot be forwarded.
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn robots_body_is_exact() {
        assert_eq!(ROBOTS_TXT, "User-agent: *\nDisallow: /\n");
    }

    #[test]
    fn found_sets_location() {
        let response = found("https://x/app.apk");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://x/app.apk"
        );
    }

    #[test]
    fn found_rejects_unencodable_location() {
        let response = found("https://x/\u{0}app");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
