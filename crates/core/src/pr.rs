//! Review-request reference extraction from commit subjects.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::models::Project;

/// Matches a parenthesised PR reference such as `(#1234)` or
/// `(ublue-os/bluefin#1234)`.
fn pr_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#(\d+)\)").expect("static regex is valid"))
}

/// Digits of the pull-request number referenced by `subject`, if any.
///
/// Kept as text so numbers wider than any integer type still link.
pub fn extract_pr_number(subject: &str) -> Option<&str> {
    pr_pattern()
        .captures(subject)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Canonical pull-request URL for the number referenced in `subject`.
///
/// Purely textual; the reference is not checked against GitHub.
pub fn resolve_pr_url(subject: &str, project: Project) -> Option<String> {
    extract_pr_number(subject).map(|n| format!("https://github.com/ublue-os/{project}/pull/{n}"))
}
