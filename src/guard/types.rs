//! Verdicts and side effects returned by the navigation guard.
//!
//! The guard never mutates shell state. It returns a verdict plus the list
//! of state changes the controller must apply.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a navigation was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowReason {
    /// An override grant is active; nothing is blocked.
    OverrideActive,
    /// The target's host is not on the blocklist.
    NotBanned,
}

/// The guard's decision for one candidate URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Allow { reason: AllowReason },
    Block { host: String },
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow { .. })
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Block { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow {
                reason: AllowReason::OverrideActive,
            } => write!(f, "allow (override active)"),
            Verdict::Allow {
                reason: AllowReason::NotBanned,
            } => write!(f, "allow"),
            Verdict::Block { host } => write!(f, "block ({})", host),
        }
    }
}

/// Which entry point asked the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The web view is about to load a URL.
    Intercept,
    /// Back / forward / reload / pull-to-refresh.
    UserAction,
    /// An external URL delivered to the app.
    DeepLink,
    /// Periodic re-check of the loaded page.
    Revalidate,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Intercept => write!(f, "intercept"),
            Trigger::UserAction => write!(f, "user_action"),
            Trigger::DeepLink => write!(f, "deep_link"),
            Trigger::Revalidate => write!(f, "revalidate"),
        }
    }
}

/// State change the controller applies after a guard call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardEffect {
    /// Present this URL as blocked.
    SetBlocked(String),
    /// Remove the blocked presentation.
    ClearBlocked,
    /// Load the homepage but keep the blocked presentation.
    LoadHome,
    /// Load this URL.
    Load(String),
}

/// Verdict plus the effects it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardOutcome {
    pub verdict: Verdict,
    pub effects: Vec<GuardEffect>,
}

impl GuardOutcome {
    pub fn is_allowed(&self) -> bool {
        self.verdict.is_allowed()
    }

    pub fn is_blocked(&self) -> bool {
        self.verdict.is_blocked()
    }
}

/// How an externally delivered URL is handled before guard evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalLink {
    /// Empty or non-web scheme: do nothing.
    Ignore,
    /// Tooling noise or unparseable: show the homepage.
    Home,
    /// A real web URL, to be evaluated.
    Candidate(String),
}
