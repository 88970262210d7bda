//! Suggested download filename

use chrono::{DateTime, Utc};
use regex::Regex;

/// Maximum length of the subject-derived stem
pub const MAX_STEM_LEN: usize = 50;

/// Stem used when the subject has nothing usable left
pub const FALLBACK_STEM: &str = "email";

static UNSAFE_CHARS: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").unwrap());

static WHITESPACE: std::sync::LazyLock<Regex> =
    std::sync::LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Reduce a subject to a filesystem- and header-safe stem
#[must_use]
pub fn sanitize_subject(subject: &str) -> String {
    let stripped = UNSAFE_CHARS.replace_all(subject, "");
    let collapsed = WHITESPACE.replace_all(stripped.trim(), "_");
    let stem: String = collapsed.chars().take(MAX_STEM_LEN).collect();

    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

/// `<stem>_<YYYYmmdd_HHMMSS>.pdf`
#[must_use]
pub fn pdf_filename(subject: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.pdf",
        sanitize_subject(subject),
        at.format("%Y%m%d_%H%M%S")
    )
}
