//! forge::factory
//!
//! Forge selection and resolver construction.
//!
//! # Design
//!
//! This module is the single place where a forge kind is turned into a
//! concrete resolver. The orchestrator dispatches on [`ForgeKind`] and
//! never imports adapter implementations directly, so HTML scraping
//! (NotaBug) sits behind the same interface as the JSON adapters; should
//! an API appear there later, only that one adapter needs replacement.

use super::gitea::GiteaResolver;
use super::gitlab::GitLabResolver;
use super::notabug::NotaBugResolver;
use super::traits::ReleaseResolver;

/// Supported forge kinds.
///
/// Each kind names a protocol family, not a single site: the
/// Gitea-compatible adapter speaks to any Gitea or Forgejo API, with
/// Codeberg as its default public host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForgeKind {
    /// Gitea / Forgejo release API (default host: codeberg.org).
    GiteaCompatible,
    /// GitLab release API (default host: gitlab.com).
    GitLab,
    /// NotaBug releases page, HTML only (default host: notabug.org).
    NotaBug,
}

impl ForgeKind {
    /// All supported kinds, in route order.
    pub fn all() -> &'static [ForgeKind] {
        &[
            ForgeKind::GiteaCompatible,
            ForgeKind::GitLab,
            ForgeKind::NotaBug,
        ]
    }

    /// The route path segment selecting this kind.
    pub fn route_segment(&self) -> &'static str {
        match self {
            ForgeKind::GiteaCompatible => "codeberg",
            ForgeKind::GitLab => "gitlab",
            ForgeKind::NotaBug => "notabug",
        }
    }

    /// The public host resolved against by default.
    pub fn default_host(&self) -> &'static str {
        match self {
            ForgeKind::GiteaCompatible => "codeberg.org",
            ForgeKind::GitLab => "gitlab.com",
            ForgeKind::NotaBug => "notabug.org",
        }
    }

    /// Parse a kind from its route segment.
    ///
    /// # Example
    ///
    /// ```
    /// use forgelink::forge::ForgeKind;
    ///
    /// assert_eq!(ForgeKind::parse("gitlab"), Some(ForgeKind::GitLab));
    /// assert_eq!(ForgeKind::parse("sourcehut"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "codeberg" => Some(ForgeKind::GiteaCompatible),
            "gitlab" => Some(ForgeKind::GitLab),
            "notabug" => Some(ForgeKind::NotaBug),
            _ => None,
        }
    }
}

impl std::fmt::Display for ForgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.route_segment())
    }
}

/// Construct the resolver for a forge kind.
pub fn create_resolver(kind: ForgeKind) -> Box<dyn ReleaseResolver> {
    match kind {
        ForgeKind::GiteaCompatible => Box::new(GiteaResolver::new()),
        ForgeKind::GitLab => Box::new(GitLabResolver::new()),
        ForgeKind::NotaBug => Box::new(NotaBugResolver::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod forge_kind {
        use super::*;

        #[test]
        fn all_has_three_kinds() {
            assert_eq!(ForgeKind::all().len(), 3);
        }

        #[test]
        fn route_segments_are_lowercase() {
            for kind in ForgeKind::all() {
                let segment = kind.route_segment();
                assert_eq!(segment, segment.to_lowercase());
            }
        }

        #[test]
        fn parse_round_trips_route_segments() {
            for kind in ForgeKind::all() {
                assert_eq!(ForgeKind::parse(kind.route_segment()), Some(*kind));
            }
        }

        #[test]
        fn parse_is_case_insensitive() {
            assert_eq!(
                ForgeKind::parse("Codeberg"),
                Some(ForgeKind::GiteaCompatible)
            );
            assert_eq!(ForgeKind::parse("NOTABUG"), Some(ForgeKind::NotaBug));
        }

        #[test]
        fn parse_unknown() {
            assert_eq!(ForgeKind::parse("github"), None);
            assert_eq!(ForgeKind::parse(""), None);
        }

        #[test]
        fn default_hosts() {
            assert_eq!(ForgeKind::GiteaCompatible.default_host(), "codeberg.org");
            assert_eq!(ForgeKind::GitLab.default_host(), "gitlab.com");
            assert_eq!(ForgeKind::NotaBug.default_host(), "notabug.org");
        }

        #[test]
        fn display_matches_route_segment() {
            assert_eq!(format!("{}", ForgeKind::GitLab), "gitlab");
        }
    }

    mod create_resolver {
        use super::*;

        #[test]
        fn names_match_kinds() {
            assert_eq!(create_resolver(ForgeKind::GiteaCompatible).name(), "gitea");
            assert_eq!(create_resolver(ForgeKind::GitLab).name(), "gitlab");
            assert_eq!(create_resolver(ForgeKind::NotaBug).name(), "notabug");
        }
    }
}
