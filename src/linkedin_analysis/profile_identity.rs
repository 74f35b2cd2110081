// src/linkedin_analysis/profile_identity.rs
//! Canonical profile identifiers derived from LinkedIn profile URLs

use regex::Regex;
use rocket::http::RawStr;
use std::sync::LazyLock;

static PROFILE_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)/in/([^/?#\s]+)").expect("profile segment pattern is valid")
});

/// Extract the profile identifier (the path segment after `/in/`).
///
/// The segment is percent-decoded, then lowercased, so that encoded, Unicode
/// and differently cased URLs map to the same stored record. Returns `None`
/// when the URL has no `/in/` segment.
pub fn extract_profile_id(url: &str) -> Option<String> {
    PROFILE_SEGMENT
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| decode_segment(m.as_str()).to_lowercase())
}

// Invalid UTF-8 after decoding keeps the segment as written.
fn decode_segment(segment: &str) -> String {
    match RawStr::new(segment).percent_decode() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => segment.to_string(),
    }
}

/// Normalize a profile URL for storage and comparison:
/// lowercase, no query string, no fragment, no trailing slash.
pub fn normalize_profile_url(url: &str) -> String {
    let mut normalized = url.trim().to_lowercase();

    if let Some(pos) = normalized.find('#') {
        normalized.truncate(pos);
    }
    if let Some(pos) = normalized.find('?') {
        normalized.truncate(pos);
    }

    normalized.trim_end_matches('/').to_string()
}

/// Resolve a lookup key that may be either a bare identifier or a full URL.
pub fn resolve_lookup_key(key: &str) -> Option<String> {
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    if key.contains('/') {
        extract_profile_id(key)
    } else {
        Some(key.to_lowercase())
    }
}
