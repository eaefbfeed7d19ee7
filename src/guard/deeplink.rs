//! Normalization of externally delivered URLs (launch URL and deep links).

use crate::guard::types::ExternalLink;
use crate::utils::address::normalize_url;
use crate::utils::hosts::{has_scheme, is_http_url, is_internal_launch_url};

/// Classify an incoming external URL.
pub fn classify_external(raw: &str) -> ExternalLink {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return ExternalLink::Ignore;
    }

    if trimmed
        .get(..6)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("exp://"))
    {
        return ExternalLink::Home;
    }

    let url = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        normalize_url(trimmed)
    };

    if !is_http_url(&url) {
        return ExternalLink::Ignore;
    }

    if is_internal_launch_url(&url) {
        return ExternalLink::Home;
    }

    ExternalLink::Candidate(url)
}
