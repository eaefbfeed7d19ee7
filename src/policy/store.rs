//! Policy store: the banned-host list the guard consults synchronously.
//!
//! Boot order: the local cache is read first and may populate the set before
//! the remote refresh completes. A successful remote refresh fully replaces the
//! list (no merge) and is written back to the cache. Any failure leaves the
//! current list untouched: stale data beats no data.

use crate::policy::source::{decode_entries, FetchError, PolicySource};
use crate::policy::types::*;
use crate::storage::{self, keys, KeyValueStore, StoreOp};
use crate::utils::hosts::canonical_host;

/// Holds the last known banned-entry list and its canonical host set.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    raw_entries: Vec<String>,
    banned: BannedHostSet,
    origin: PolicyOrigin,
}

impl PolicyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store directly from entries (used by tests and the CLI).
    pub fn with_entries(entries: Vec<String>, origin: PolicyOrigin) -> Self {
        let mut store = Self::new();
        store.replace(entries, origin);
        store
    }

    /// Read the cached list. Missing, unreadable or malformed caches yield an empty list.
    pub async fn load_cached(store: &dyn KeyValueStore) -> Vec<String> {
        let Some(raw) = storage::read_or_none(store, keys::BANNED_CACHE).await else {
            return Vec::new();
        };
        match decode_entries(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Ignoring malformed banned-host cache: {}", e);
                Vec::new()
            }
        }
    }

    /// Apply a freshly loaded list.
    ///
    /// Returns the outcome and, for remote lists, the cache write that should
    /// follow (best-effort). A cache list never overrides a remote one.
    pub fn apply(
        &mut self,
        entries: Vec<String>,
        origin: PolicyOrigin,
    ) -> (PolicyUpdate, Option<StoreOp>) {
        if origin == PolicyOrigin::Cache && self.origin == PolicyOrigin::Remote {
            tracing::debug!("Cached blocklist arrived after remote refresh, ignoring");
            return (PolicyUpdate::IgnoredStaleCache, None);
        }

        let cache_write = if origin == PolicyOrigin::Remote {
            serde_json::to_string(&entries)
                .ok()
                .map(|json| StoreOp::set(keys::BANNED_CACHE, json))
        } else {
            None
        };

        self.replace(entries, origin);
        tracing::info!(
            "Blocklist replaced from {} ({} hosts)",
            origin,
            self.banned.len()
        );
        (PolicyUpdate::Applied, cache_write)
    }

    /// Fetch from the remote source and apply on success.
    /// On failure the current list is kept and the error returned for logging.
    pub async fn refresh_from_remote(
        &mut self,
        source: &dyn PolicySource,
        store: &dyn KeyValueStore,
    ) -> Result<usize, FetchError> {
        let entries = source.fetch().await?;
        let (_, cache_write) = self.apply(entries, PolicyOrigin::Remote);
        if let Some(op) = cache_write {
            storage::best_effort(store, op).await;
        }
        Ok(self.raw_entries.len())
    }

    /// True when the URL's canonical host is non-empty and banned.
    pub fn is_banned(&self, url: &str) -> bool {
        self.matched_host(url).is_some()
    }

    /// The canonical host that made `url` banned, if any.
    pub fn matched_host(&self, url: &str) -> Option<String> {
        let host = canonical_host(url);
        if !host.is_empty() && self.banned.contains(&host) {
            Some(host)
        } else {
            None
        }
    }

    pub fn raw_entries(&self) -> &[String] {
        &self.raw_entries
    }

    pub fn banned_hosts(&self) -> &BannedHostSet {
        &self.banned
    }

    pub fn origin(&self) -> PolicyOrigin {
        self.origin
    }

    fn replace(&mut self, entries: Vec<String>, origin: PolicyOrigin) {
        self.banned = BannedHostSet::from_entries(&entries);
        self.raw_entries = entries;
        self.origin = origin;
    }
}
