//! Address-bar submission handling.
//!
//! Text typed into the address bar is either a URL-ish string (loaded
//! directly) or a search query (routed to the search engine). Neither path is
//! guard-evaluated here; the resulting navigation goes through the guard's
//! pre-navigation interception like any other load.

use crate::utils::hosts::has_scheme;
use url::form_urlencoded;

/// Query suffix appended to every search URL.
const SEARCH_SUFFIX: &str = "&rpl=1&ia=web&assist=false";

/// What a submitted address-bar string resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Blank input: go to the homepage.
    Home,
    /// Looked like a URL: load it (scheme added if missing).
    Url(String),
    /// Anything else: a search results URL.
    Search(String),
}

impl Submission {
    /// The concrete URL to load for this submission.
    pub fn into_url(self, home_url: &str) -> String {
        match self {
            Submission::Home => home_url.to_string(),
            Submission::Url(url) | Submission::Search(url) => url,
        }
    }
}

/// URL-like means: no spaces, and either an explicit scheme or at least one dot.
pub fn is_likely_url(text: &str) -> bool {
    let value = text.trim();
    if value.is_empty() || value.contains(' ') {
        return false;
    }
    has_scheme(value) || value.contains('.')
}

/// Prefix `https://` unless the text already carries a scheme.
pub fn normalize_url(text: &str) -> String {
    let value = text.trim();
    if has_scheme(value) {
        value.to_string()
    } else {
        format!("https://{}", value)
    }
}

/// Build the search results URL for a free-text query.
pub fn build_search_url(query: &str, search_base: &str) -> String {
    // form_urlencoded writes spaces as '+'; the search endpoint expects %20.
    let encoded: String = form_urlencoded::byte_serialize(query.trim().as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("{}{}{}", search_base, encoded, SEARCH_SUFFIX)
}

/// Classify a submitted address-bar string.
pub fn classify_submission(text: &str, search_base: &str) -> Submission {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Submission::Home
    } else if is_likely_url(trimmed) {
        Submission::Url(normalize_url(trimmed))
    } else {
        Submission::Search(build_search_url(trimmed, search_base))
    }
}
