//! forge
//!
//! Per-forge protocol adapters behind one trait.
//!
//! # Architecture
//!
//! The [`ReleaseResolver`] trait defines the interface for resolving a
//! release asset against a remote forge. The orchestrator selects an
//! adapter through [`factory::create_resolver`] keyed by [`ForgeKind`];
//! adapters never know about one another.
//!
//! # Modules
//!
//! - `traits`: Core `ReleaseResolver` trait, request/outcome types, error taxonomy
//! - [`gitea`]: Gitea-compatible JSON release API (Codeberg et al.)
//! - [`gitlab`]: GitLab JSON release API plus description-embedded uploads
//! - [`notabug`]: NotaBug HTML releases page scraper
//! - `factory`: Forge kind enum and resolver construction
//! - [`mock`]: Call-recording mock for deterministic testing

pub mod factory;
pub mod gitea;
pub mod gitlab;
pub mod mock;
pub mod notabug;
mod traits;

pub use factory::{create_resolver, ForgeKind};
pub use traits::*;
