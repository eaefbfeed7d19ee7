//! Override window: grant, countdown, expiry and the daily-use lock.
//!
//! The daily lock is keyed by `last_date`, independent of the grant's
//! lifetime: once a grant is consumed (or the day is locked manually) no new
//! grant can be created until the day key changes, even after the grant has
//! expired or been cleared.

use crate::override_window::clock::day_key_of;
use crate::override_window::types::*;
use crate::storage::{self, keys, KeyValueStore, StoreOp};
use chrono::{DateTime, FixedOffset};

/// Override state owned by the shell controller.
#[derive(Debug, Clone)]
pub struct OverrideWindow {
    settings: OverrideSettings,
    grant: Option<OverrideGrant>,
    last_date: Option<String>,
    /// Activity observed at the previous tick, for expiry edge detection
    was_active: bool,
    /// First tap of a potential double-tap, epoch ms
    pending_tap_ms: Option<i64>,
}

impl OverrideWindow {
    pub fn new(settings: OverrideSettings) -> Self {
        Self {
            settings,
            grant: None,
            last_date: None,
            was_active: false,
            pending_tap_ms: None,
        }
    }

    /// Read the persisted grant and last-override day. Failures and malformed
    /// blobs read as absent.
    pub async fn load_persisted(
        store: &dyn KeyValueStore,
    ) -> (Option<OverrideGrant>, Option<String>) {
        let grant = storage::read_or_none(store, keys::OVERRIDE_GRANT)
            .await
            .and_then(|raw| match serde_json::from_str::<OverrideGrant>(&raw) {
                Ok(grant) => Some(grant),
                Err(e) => {
                    tracing::warn!("Ignoring malformed override grant: {}", e);
                    None
                }
            });
        let last_date = storage::read_or_none(store, keys::LAST_OVERRIDE_DATE)
            .await
            .filter(|day| !day.trim().is_empty());
        (grant, last_date)
    }

    /// Rehydrate persisted state at boot. A grant already held in memory wins;
    /// the last-override day only ever moves forward.
    pub fn restore(
        &mut self,
        grant: Option<OverrideGrant>,
        last_date: Option<String>,
        now: &DateTime<FixedOffset>,
    ) {
        if self.grant.is_none() {
            self.grant = grant;
        }
        if let Some(day) = last_date {
            self.advance_last_date(day);
        }
        self.was_active = self.is_active(now);
    }

    pub fn is_active(&self, now: &DateTime<FixedOffset>) -> bool {
        self.settings.enabled
            && self
                .grant
                .as_ref()
                .map_or(false, |g| g.is_active(now.timestamp_millis()))
    }

    /// A fresh grant may be requested once per calendar day.
    pub fn is_available(&self, now: &DateTime<FixedOffset>) -> bool {
        self.settings.enabled && self.last_date.as_deref() != Some(day_key_of(now).as_str())
    }

    pub fn offer(&self, now: &DateTime<FixedOffset>) -> OverrideOffer {
        if !self.settings.enabled {
            OverrideOffer::Disabled
        } else if self.is_available(now) {
            OverrideOffer::Available
        } else {
            OverrideOffer::UsedToday
        }
    }

    /// Create a grant expiring after the configured duration.
    /// Returns `None` (and changes nothing) when no grant is available today.
    pub fn grant(&mut self, now: &DateTime<FixedOffset>) -> Option<(OverrideGrant, Vec<StoreOp>)> {
        if !self.is_available(now) {
            tracing::debug!("Override requested but not available today");
            return None;
        }

        let Some(expires_at) = now.checked_add_signed(self.settings.duration) else {
            tracing::warn!("Override duration overflows the clock; not granting");
            return None;
        };
        let today = day_key_of(now);
        let grant = OverrideGrant {
            granted_on: today.clone(),
            expires_at_ms: expires_at.timestamp_millis(),
        };
        self.grant = Some(grant.clone());
        // The day just consumed is the lock key, even if an earlier
        // offset left a later key behind.
        self.last_date = Some(today);
        self.was_active = true;
        self.pending_tap_ms = None;

        tracing::info!(
            "Override granted until {} (epoch ms)",
            grant.expires_at_ms
        );

        let mut writes = Vec::with_capacity(2);
        if let Ok(json) = serde_json::to_string(&grant) {
            writes.push(StoreOp::set(keys::OVERRIDE_GRANT, json));
        }
        writes.extend(self.last_date_write());
        Some((grant, writes))
    }

    /// Drop the grant. With `lock_for_day`, also mark today as used so no
    /// grant can be requested until tomorrow.
    pub fn clear(&mut self, lock_for_day: bool, now: &DateTime<FixedOffset>) -> Vec<StoreOp> {
        self.grant = None;
        self.was_active = false;
        self.pending_tap_ms = None;

        let mut writes = vec![StoreOp::remove(keys::OVERRIDE_GRANT)];
        if lock_for_day {
            self.last_date = Some(day_key_of(now));
            writes.extend(self.last_date_write());
            tracing::info!("Override cleared and locked for {}", day_key_of(now));
        } else {
            tracing::info!("Override cleared");
        }
        writes
    }

    /// Sample the clock. Detects the active → inactive edge of a natural
    /// expiry and clears the grant without touching the daily lock.
    pub fn tick(&mut self, now: &DateTime<FixedOffset>) -> TickOutcome {
        let active = self.is_active(now);
        let expired = self.was_active && !active;
        self.was_active = active;

        if !expired {
            return TickOutcome::Unchanged;
        }

        tracing::info!("Override window expired");
        self.grant = None;
        self.pending_tap_ms = None;
        TickOutcome::Expired {
            writes: vec![StoreOp::remove(keys::OVERRIDE_GRANT)],
        }
    }

    /// Record an activation of the override timer control.
    /// Returns true when this activation completes a double-tap (the caller
    /// should then lock the day). Ignored while no grant is active.
    pub fn register_timer_tap(&mut self, now: &DateTime<FixedOffset>) -> bool {
        if !self.is_active(now) {
            return false;
        }
        let now_ms = now.timestamp_millis();
        match self.pending_tap_ms {
            Some(first) if now_ms - first < self.settings.lock_tap_window_ms => {
                self.pending_tap_ms = None;
                true
            }
            _ => {
                self.pending_tap_ms = Some(now_ms);
                false
            }
        }
    }

    /// Time left on the active grant.
    pub fn remaining(&self, now: &DateTime<FixedOffset>) -> Option<chrono::Duration> {
        if !self.is_active(now) {
            return None;
        }
        self.grant
            .as_ref()
            .map(|g| chrono::Duration::milliseconds(g.remaining_ms(now.timestamp_millis())))
    }

    /// Countdown as `MM:SS` while a grant is active.
    pub fn timer_text(&self, now: &DateTime<FixedOffset>) -> Option<String> {
        self.remaining(now).map(|left| {
            let total = left.num_seconds();
            format!("{:02}:{:02}", total / 60, total % 60)
        })
    }

    pub fn current_grant(&self) -> Option<&OverrideGrant> {
        self.grant.as_ref()
    }

    pub fn last_date(&self) -> Option<&str> {
        self.last_date.as_deref()
    }

    pub fn settings(&self) -> &OverrideSettings {
        &self.settings
    }

    fn advance_last_date(&mut self, day: String) {
        // Day keys are YYYY-MM-DD, so string order is date order.
        let newer = self.last_date.as_ref().map_or(true, |prev| day > *prev);
        if newer {
            self.last_date = Some(day);
        }
    }

    fn last_date_write(&self) -> Option<StoreOp> {
        self.last_date
            .as_ref()
            .map(|day| StoreOp::set(keys::LAST_OVERRIDE_DATE, day.clone()))
    }
}
