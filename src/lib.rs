//! Forgelink - a release-asset redirect service for code forges
//!
//! Forgelink resolves a logical request ("the download URL for asset A of
//! release R of project P under namespace N on forge F") into either a
//! redirect target or a numeric failure code, by querying the forge's own
//! release API (or, for NotaBug, scraping its HTML release page). Clients
//! are typically package managers following redirects to fetch release
//! artifacts without knowing each forge's URL scheme.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`server`] - HTTP boundary (routes, rate limiting, client addressing)
//! - [`resolver`] - Orchestrates validation, dispatch, and outcome mapping
//! - [`forge`] - Per-forge protocol adapters behind one trait
//! - [`validate`] - Path-parameter grammar enforcement
//! - [`config`] - Process configuration from environment variables
//!
//! # Correctness Invariants
//!
//! Forgelink maintains the following invariants:
//!
//! 1. No resolver runs until every path parameter passes validation
//! 2. Each resolution performs at most one upstream fetch, with a fixed
//!    timeout and no retries
//! 3. Upstream failures never escape the resolver boundary as errors; they
//!    are converted to a failure code
//! 4. Resolution holds no cross-request state and is idempotent for a
//!    fixed upstream response

pub mod config;
pub mod forge;
pub mod resolver;
pub mod server;
pub mod validate;
