//! Types for the temporary override window.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A time-boxed bypass of the blocklist.
/// Persisted as `{"date": "<day key>", "expiresAt": <epoch ms>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideGrant {
    /// Day key on which the grant was consumed
    #[serde(rename = "date")]
    pub granted_on: String,
    /// Expiry as Unix epoch milliseconds
    #[serde(rename = "expiresAt")]
    pub expires_at_ms: i64,
}

impl OverrideGrant {
    pub fn is_active(&self, now_ms: i64) -> bool {
        self.expires_at_ms > now_ms
    }

    pub fn remaining_ms(&self, now_ms: i64) -> i64 {
        (self.expires_at_ms - now_ms).max(0)
    }
}

/// What the blocked notice can offer the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideOffer {
    /// A grant can be requested now.
    Available,
    /// Today's grant was already consumed or locked.
    UsedToday,
    /// Overrides are switched off in configuration.
    Disabled,
}

impl fmt::Display for OverrideOffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideOffer::Available => write!(f, "available"),
            OverrideOffer::UsedToday => write!(f, "used today"),
            OverrideOffer::Disabled => write!(f, "disabled"),
        }
    }
}

/// Override behavior knobs (from `ShellConfig`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideSettings {
    pub enabled: bool,
    /// Lifetime of a grant
    pub duration: chrono::Duration,
    /// Two timer-control activations closer than this lock the day
    pub lock_tap_window_ms: i64,
}

impl Default for OverrideSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            duration: chrono::Duration::minutes(30),
            lock_tap_window_ms: 350,
        }
    }
}

/// Result of sampling the clock against the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing changed.
    Unchanged,
    /// The grant ran out since the last tick; the grant was dropped and these
    /// writes should follow.
    Expired { writes: Vec<crate::storage::StoreOp> },
}
