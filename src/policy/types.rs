//! Core types for the host blocklist.

use crate::utils::hosts::canonical_host;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Where the current banned-entry list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyOrigin {
    /// Nothing loaded yet: nothing is banned.
    #[default]
    None,
    /// Rehydrated from the local cache at boot.
    Cache,
    /// Fetched from the remote policy source.
    Remote,
}

impl fmt::Display for PolicyOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyOrigin::None => write!(f, "none"),
            PolicyOrigin::Cache => write!(f, "cache"),
            PolicyOrigin::Remote => write!(f, "remote"),
        }
    }
}

/// Set of canonical banned hosts.
/// Membership is exact equality on the canonical host: no wildcarding
/// beyond the `www.` strip applied by `canonical_host`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedHostSet {
    hosts: HashSet<String>,
}

impl BannedHostSet {
    /// Canonicalize every entry. Entries that reduce to an empty host are dropped.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Self {
        let hosts = entries
            .iter()
            .map(|entry| canonical_host(entry.as_ref()))
            .filter(|host| !host.is_empty())
            .collect();
        Self { hosts }
    }

    pub fn contains(&self, canonical: &str) -> bool {
        self.hosts.contains(canonical)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }
}

/// Result of applying a new entry list to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyUpdate {
    /// The list replaced the previous one.
    Applied,
    /// A cache load arrived after a remote refresh had already succeeded.
    IgnoredStaleCache,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_canonicalizes_entries() {
        let set = BannedHostSet::from_entries(&[
            "https://www.Example.com/path",
            "news.ycombinator.com",
            "",
            "   ",
        ]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("example.com"));
        assert!(set.contains("news.ycombinator.com"));
        assert!(!set.contains(""));
    }

    #[test]
    fn test_no_subdomain_wildcarding() {
        let set = BannedHostSet::from_entries(&["example.com"]);
        assert!(!set.contains("m.example.com"));
    }
}
