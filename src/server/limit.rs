//! server::limit
//!
//! Fixed-window rate limiting for the forge routes.
//!
//! # Design
//!
//! A [`RateLimiter`] counts requests per client within non-overlapping
//! windows. Counters live in a mutex-guarded map, which is safe for
//! concurrent increment-and-check across async worker threads; the state
//! is in-memory only, so quotas reset on restart and are per-process.
//! Expired windows are evicted on every count, so the map never holds
//! clients past their window.
//!
//! Quotas mirror the public deployment: 60 requests/hour per client on
//! each forge route, 120/hour on the GitLab route (package managers poll
//! GitLab-hosted projects hardest). Routes count independently: a
//! client's codeberg traffic does not spend its notabug quota. `/` and
//! `/robots.txt` carry no limiter at all.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::{addr, AppState};
use crate::forge::ForgeKind;

/// Length of one counting window.
pub const WINDOW: Duration = Duration::from_secs(3600);

/// Requests per window on the default forge routes.
pub const DEFAULT_QUOTA: u32 = 60;

/// Requests per window on the GitLab route.
pub const GITLAB_QUOTA: u32 = 120;

/// One independent [`RateLimiter`] per forge route.
#[derive(Debug)]
pub struct RouteLimiters {
    codeberg: RateLimiter,
    gitlab: RateLimiter,
    notabug: RateLimiter,
}

impl RouteLimiters {
    /// Limiters at the deployment quotas.
    pub fn enforcing() -> Self {
        Self {
            codeberg: RateLimiter::new(DEFAULT_QUOTA, WINDOW),
            gitlab: RateLimiter::new(GITLAB_QUOTA, WINDOW),
            notabug: RateLimiter::new(DEFAULT_QUOTA, WINDOW),
        }
    }

    /// Limiters that admit everything.
    pub fn disabled() -> Self {
        Self {
            codeberg: RateLimiter::disabled(),
            gitlab: RateLimiter::disabled(),
            notabug: RateLimiter::disabled(),
        }
    }

    /// The counter for one forge's route.
    pub fn for_route(&self, forge: ForgeKind) -> &RateLimiter {
        match forge {
            ForgeKind::GiteaCompatible => &self.codeberg,
            ForgeKind::GitLab => &self.gitlab,
            ForgeKind::NotaBug => &self.notabug,
        }
    }
}

/// Per-client fixed-window request counter.
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    quota: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    /// Create an enforcing limiter.
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            enabled: true,
            quota,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Create a limiter that admits everything.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            quota: 0,
            window: WINDOW,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Count one request for `client` and report whether it is admitted.
    ///
    /// The first request past the quota within a window is rejected; a
    /// client's counter resets when its window elapses.
    pub fn allow(&self, client: IpAddr) -> bool {
        if !self.enabled {
            return true;
        }

        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        // Dropping expired windows wholesale both resets counters and
        // keeps the map bounded by the set of clients seen this window.
        windows.retain(|_, w| now.duration_since(w.started) < self.window);

        let window = windows.entry(client).or_insert(Window {
            started: now,
            count: 0,
        });
        if window.count < self.quota {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// Middleware enforcing the codeberg-route quota.
pub async fn enforce_codeberg(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, ForgeKind::GiteaCompatible, request, next).await
}

/// Middleware enforcing the GitLab-route quota.
pub async fn enforce_gitlab(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, ForgeKind::GitLab, request, next).await
}

/// Middleware enforcing the notabug-route quota.
pub async fn enforce_notabug(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    enforce(&state, ForgeKind::NotaBug, request, next).await
}

async fn enforce(state: &AppState, forge: ForgeKind, request: Request, next: Next) -> Response {
    let limiter = state.limiters.for_route(forge);
    let client = addr::client_ip(
        request.headers(),
        request.extensions(),
        state.config.trust_forwarded,
    );

    if limiter.allow(client) {
        next.run(request).await
    } else {
        tracing::debug!(client = %client, route = %forge, "rate limit exceeded");
        StatusCode::TOO_MANY_REQUESTS.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, last))
    }

    #[test]
    fn admits_up_to_quota_then_rejects() {
        let limiter = RateLimiter::new(3, WINDOW);
        assert!(limiter.allow(ip(1)));
        assert!(limiter.allow(ip(1)));
        assert!(limiter.allow(ip(1)));
        assert!(!limiter.allow(ip(1)));
        assert!(!limiter.allow(ip(1)));
    }

    #[test]
    fn clients_count_independently() {
        let limiter = RateLimiter::new(1, WINDOW);
        assert!(limiter.allow(ip(1)));
        assert!(!limiter.allow(ip(1)));
        assert!(limiter.allow(ip(2)));
    }

    #[test]
    fn window_elapse_resets_the_counter() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.allow(ip(1)));
        assert!(!limiter.allow(ip(1)));

        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.allow(ip(1)));
    }

    #[test]
    fn stale_clients_are_evicted_from_the_map() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        for last in 1..=50 {
            assert!(limiter.allow(ip(last)));
        }
        std::thread::sleep(Duration::from_millis(30));

        // Counting any request after the window drops every expired
        // entry, leaving only the client just seen.
        assert!(limiter.allow(ip(51)));
        let windows = limiter.windows.lock().unwrap_or_else(|e| e.into_inner());
        assert_eq!(windows.len(), 1);
        assert!(windows.contains_key(&ip(51)));
    }

    #[test]
    fn route_limiters_count_per_route() {
        let limiters = RouteLimiters::enforcing();
        for _ in 0..DEFAULT_QUOTA {
            assert!(limiters.for_route(ForgeKind::GiteaCompatible).allow(ip(1)));
        }
        assert!(!limiters.for_route(ForgeKind::GiteaCompatible).allow(ip(1)));
        assert!(limiters.for_route(ForgeKind::NotaBug).allow(ip(1)));
        assert!(limiters.for_route(ForgeKind::GitLab).allow(ip(1)));
    }

    #[test]
    fn disabled_limiter_admits_everything() {
        let limiter = RateLimiter::disabled();
        for _ in 0..1000 {
            assert!(limiter.allow(ip(1)));
        }
    }
}
