//! Persisted shell state, loaded for the one-shot CLI commands.

use crate::config::ShellConfig;
use crate::guard::{GuardOutcome, NavigationGuard};
use crate::override_window::{Clock, OverrideWindow, SystemClock};
use crate::policy::{PolicyOrigin, PolicyStore};
use crate::storage::{self, FileStore, StoreOp};
use chrono::{DateTime, FixedOffset};

/// Blocklist and override state as the shell would see it at boot.
pub struct LocalState {
    pub store: FileStore,
    pub policy: PolicyStore,
    pub window: OverrideWindow,
    pub now: DateTime<FixedOffset>,
}

impl LocalState {
    pub async fn load(config: &ShellConfig) -> Self {
        let store = FileStore::new(&config.state_dir);
        let now = SystemClock::new(config.day_boundary).now();

        let cached = PolicyStore::load_cached(&store).await;
        let origin = if cached.is_empty() {
            PolicyOrigin::None
        } else {
            PolicyOrigin::Cache
        };
        let policy = PolicyStore::with_entries(cached, origin);

        let mut window = OverrideWindow::new(config.override_settings.clone());
        let (grant, last_date) = OverrideWindow::load_persisted(&store).await;
        window.restore(grant, last_date, &now);

        Self {
            store,
            policy,
            window,
            now,
        }
    }

    pub fn evaluate(&self, url: &str) -> GuardOutcome {
        NavigationGuard::new(&self.policy, &self.window).evaluate(url, None, &self.now)
    }

    /// Persist writes in order; failures are logged and skipped.
    pub async fn persist(&self, writes: Vec<StoreOp>) {
        for op in writes {
            storage::best_effort(&self.store, op).await;
        }
    }
}
