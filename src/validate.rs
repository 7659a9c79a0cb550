//! validate
//!
//! Path-parameter grammar enforcement.
//!
//! # Design
//!
//! Every path parameter is interpolated directly into an upstream URL or
//! search pattern, so the accepted grammar is deliberately narrow:
//! `[A-Za-z0-9._-]+`. No slashes, no percent-encoding, no whitespace.
//! This rules out path traversal, upstream query injection, and
//! pattern-breaking characters before any network call is made.
//!
//! Validation runs first in the resolution pipeline: a malformed request
//! is rejected without spending the upstream fetch budget.

/// Check a single path segment against the identifier grammar.
///
/// Returns `true` iff the segment is non-empty and every byte is an ASCII
/// letter, digit, dot, underscore, or hyphen.
///
/// # Example
///
/// ```
/// use forgelink::validate::valid_segment;
///
/// assert!(valid_segment("app-1.2.3.apk"));
/// assert!(!valid_segment("../etc/passwd"));
/// assert!(!valid_segment(""));
/// ```
pub fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
}

/// Check every segment in a request against the identifier grammar.
///
/// Any single rejected segment rejects the whole request.
pub fn valid_segments(segments: &[&str]) -> bool {
    segments.iter().all(|s| valid_segment(s))
}
