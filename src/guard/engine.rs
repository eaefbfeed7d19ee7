//! Navigation guard: decides allow/block for every navigation attempt.
//!
//! Evaluation order for one candidate URL:
//! 1. An active override allows everything, including navigations already
//!    in flight.
//! 2. A canonical-host match on the blocklist blocks and marks the candidate
//!    as the blocked target.
//! 3. Anything else is allowed; if the candidate was the blocked target, the
//!    block presentation is cleared.
//!
//! The guard borrows the policy store and override window read-only and is
//! rebuilt for every call, so it always sees the state of the current event.

use crate::guard::types::*;
use crate::override_window::OverrideWindow;
use crate::policy::PolicyStore;
use chrono::{DateTime, FixedOffset};

/// Read-only view over the state a verdict depends on.
#[derive(Debug, Clone, Copy)]
pub struct NavigationGuard<'a> {
    policy: &'a PolicyStore,
    window: &'a OverrideWindow,
}

impl<'a> NavigationGuard<'a> {
    pub fn new(policy: &'a PolicyStore, window: &'a OverrideWindow) -> Self {
        Self { policy, window }
    }

    /// Core decision for a candidate URL given the currently blocked target.
    pub fn evaluate(
        &self,
        candidate: &str,
        blocked: Option<&str>,
        now: &DateTime<FixedOffset>,
    ) -> GuardOutcome {
        if self.window.is_active(now) {
            return GuardOutcome {
                verdict: Verdict::Allow {
                    reason: AllowReason::OverrideActive,
                },
                effects: Vec::new(),
            };
        }

        if let Some(host) = self.policy.matched_host(candidate) {
            return GuardOutcome {
                verdict: Verdict::Block { host },
                effects: vec![GuardEffect::SetBlocked(candidate.to_string())],
            };
        }

        let effects = if blocked == Some(candidate) {
            vec![GuardEffect::ClearBlocked]
        } else {
            Vec::new()
        };
        GuardOutcome {
            verdict: Verdict::Allow {
                reason: AllowReason::NotBanned,
            },
            effects,
        }
    }

    /// Pre-navigation interception. A block must cancel the load; an allowed
    /// navigation always clears any blocked presentation.
    pub fn intercept(
        &self,
        url: &str,
        blocked: Option<&str>,
        now: &DateTime<FixedOffset>,
    ) -> GuardOutcome {
        let mut outcome = self.evaluate(url, blocked, now);
        if outcome.is_allowed() && blocked.is_some() && outcome.effects.is_empty() {
            outcome.effects.push(GuardEffect::ClearBlocked);
        }
        log_verdict(Trigger::Intercept, url, &outcome);
        outcome
    }

    /// Guard for back / forward / reload / pull-to-refresh.
    ///
    /// Checks the pending blocked target if there is one, otherwise the loaded
    /// page, so repeating the action cannot slip past a block on screen.
    pub fn user_action(
        &self,
        current: &str,
        blocked: Option<&str>,
        now: &DateTime<FixedOffset>,
    ) -> GuardOutcome {
        let candidate = blocked.unwrap_or(current);
        let outcome = self.evaluate(candidate, blocked, now);
        log_verdict(Trigger::UserAction, candidate, &outcome);
        outcome
    }

    /// Evaluate an external URL that survived deep-link classification.
    /// Allowed links are loaded; blocked ones are only presented.
    pub fn deep_link(
        &self,
        url: &str,
        blocked: Option<&str>,
        now: &DateTime<FixedOffset>,
    ) -> GuardOutcome {
        let mut outcome = self.evaluate(url, blocked, now);
        if outcome.is_allowed() {
            outcome.effects = vec![
                GuardEffect::ClearBlocked,
                GuardEffect::Load(url.to_string()),
            ];
        }
        log_verdict(Trigger::DeepLink, url, &outcome);
        outcome
    }

    /// Periodic re-check of the loaded page, covering blocklist changes
    /// after the page finished loading. A newly banned page is presented as
    /// blocked and the shell is sent home.
    pub fn revalidate(
        &self,
        current: &str,
        blocked: Option<&str>,
        home_url: &str,
        now: &DateTime<FixedOffset>,
    ) -> GuardOutcome {
        if current.is_empty() {
            return self.evaluate(current, None, now);
        }
        let mut outcome = self.evaluate(current, blocked, now);
        if outcome.is_blocked() {
            if blocked == Some(current) {
                outcome.effects.clear();
            }
            if current != home_url {
                outcome.effects.push(GuardEffect::LoadHome);
            }
            log_verdict(Trigger::Revalidate, current, &outcome);
        }
        outcome
    }
}

fn log_verdict(trigger: Trigger, url: &str, outcome: &GuardOutcome) {
    tracing::debug!("guard[{}] {} -> {}", trigger, url, outcome.verdict);
}
