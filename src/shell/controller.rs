//! Shell controller: the single dispatch point for every shell event.
//!
//! Owns all mutable shell state. Each call runs one transition to completion
//! and returns the effects to carry out; nothing here awaits, so the guard
//! always sees a policy store and override window consistent with the event
//! being handled.

use crate::config::ShellConfig;
use crate::guard::{classify_external, ExternalLink, GuardEffect, NavigationGuard};
use crate::override_window::{OverrideGrant, OverrideWindow, TickOutcome};
use crate::policy::{PolicyOrigin, PolicyStore, PolicyUpdate};
use crate::session::{SessionContinuity, SessionSnapshot, SYNC_STORAGE_SCRIPT};
use crate::shell::events::*;
use crate::shell::state::ShellState;
use crate::storage::StoreOp;
use crate::utils::address::classify_submission;
use chrono::{DateTime, FixedOffset};

pub struct ShellController {
    config: ShellConfig,
    state: ShellState,
    policy: PolicyStore,
    window: OverrideWindow,
    session: SessionContinuity,
}

impl ShellController {
    pub fn new(config: ShellConfig) -> Self {
        let state = ShellState::new(&config.home_url);
        let window = OverrideWindow::new(config.override_settings.clone());
        Self {
            config,
            state,
            policy: PolicyStore::new(),
            window,
            session: SessionContinuity::new(),
        }
    }

    /// Install a banned-entry list from the cache or the remote source.
    /// A cache list arriving after a remote one is dropped.
    pub fn apply_policy(&mut self, entries: Vec<String>, origin: PolicyOrigin) -> Vec<Effect> {
        let (update, cache_write) = self.policy.apply(entries, origin);
        if update == PolicyUpdate::IgnoredStaleCache {
            return Vec::new();
        }
        cache_write.map(Effect::Store).into_iter().collect()
    }

    /// Rehydrate the persisted override grant and last-override day.
    pub fn restore_override(
        &mut self,
        grant: Option<OverrideGrant>,
        last_date: Option<String>,
        now: &DateTime<FixedOffset>,
    ) {
        self.window.restore(grant, last_date, now);
        if self.window.is_active(now) {
            self.state.blocked_target = None;
        }
    }

    /// Rehydrate cookies and session storage; returns the hydration script
    /// to install in the web view.
    pub fn restore_session(&mut self, snapshot: SessionSnapshot) -> Vec<Effect> {
        let script = self.session.restore(snapshot).to_string();
        vec![command(ShellCommand::SetHydrationScript { script })]
    }

    /// Handle one event.
    pub fn handle(&mut self, event: ShellEvent, now: &DateTime<FixedOffset>) -> Vec<Effect> {
        tracing::trace!("Handling {}", event.name());
        let mut effects = Vec::new();

        match event {
            ShellEvent::NavigationRequested { url, request_id } => {
                let outcome = self.guard().intercept(&url, self.state.blocked(), now);
                let allow = outcome.is_allowed();
                self.apply_guard_effects(outcome.effects, &mut effects);
                effects.push(command(ShellCommand::ResolveNavigation {
                    request_id,
                    url,
                    allow,
                }));
            }

            ShellEvent::NavigationStateChanged {
                url,
                can_go_back,
                can_go_forward,
            } => {
                self.state.can_go_back = can_go_back;
                self.state.can_go_forward = can_go_forward;
                self.state.navigate_to(&url);
                effects.push(command(ShellCommand::InjectScript {
                    script: SYNC_STORAGE_SCRIPT.to_string(),
                }));
            }

            ShellEvent::LoadProgress { progress } => {
                self.state.load_progress = if progress.is_finite() {
                    progress.clamp(0.0, 1.0)
                } else {
                    0.0
                };
            }

            ShellEvent::LoadEnd => self.state.load_progress = 1.0,

            ShellEvent::PageMessage { data } => {
                if let Some(writes) = self.session.handle_message(&data) {
                    push_writes(writes, &mut effects);
                    effects.push(command(ShellCommand::SetHydrationScript {
                        script: self.session.hydration_script().to_string(),
                    }));
                }
            }

            ShellEvent::AddressSubmitted { text } => {
                let url = classify_submission(&text, &self.config.search_base)
                    .into_url(&self.config.home_url);
                self.load(url, &mut effects);
            }

            ShellEvent::Back => {
                let enabled = self.state.can_go_back;
                self.guarded_action(enabled.then_some(ShellCommand::GoBack), now, &mut effects);
            }

            ShellEvent::Forward => {
                let enabled = self.state.can_go_forward;
                self.guarded_action(enabled.then_some(ShellCommand::GoForward), now, &mut effects);
            }

            ShellEvent::Reload | ShellEvent::PullToRefresh => {
                self.guarded_action(Some(ShellCommand::Reload), now, &mut effects);
            }

            ShellEvent::HardwareBack => self.hardware_back(now, &mut effects),

            ShellEvent::GoHome => self.go_home(&mut effects),

            ShellEvent::OverrideRequested => {
                if let Some((_, writes)) = self.window.grant(now) {
                    push_writes(writes, &mut effects);
                    if let Some(target) = self.state.blocked_target.take() {
                        self.load(target, &mut effects);
                    }
                }
            }

            ShellEvent::OverrideTimerPressed => {
                if self.window.register_timer_tap(now) {
                    let writes = self.window.clear(true, now);
                    push_writes(writes, &mut effects);
                    self.go_home(&mut effects);
                }
            }

            ShellEvent::DeepLink { url } => match classify_external(&url) {
                ExternalLink::Ignore => tracing::debug!("Ignoring external link {:?}", url),
                ExternalLink::Home => self.go_home(&mut effects),
                ExternalLink::Candidate(candidate) => {
                    let outcome = self
                        .guard()
                        .deep_link(&candidate, self.state.blocked(), now);
                    self.apply_guard_effects(outcome.effects, &mut effects);
                }
            },

            ShellEvent::ConnectivityChanged { reachable } => {
                if self.state.offline == reachable {
                    tracing::info!(
                        "Connectivity changed: {}",
                        if reachable { "online" } else { "offline" }
                    );
                }
                self.state.offline = !reachable;
            }

            ShellEvent::ClockTick => {
                if let TickOutcome::Expired { writes } = self.window.tick(now) {
                    push_writes(writes, &mut effects);
                    self.go_home(&mut effects);
                }
            }

            ShellEvent::RevalidateTick => {
                if self.window.is_active(now) {
                    return effects;
                }
                let outcome = self.guard().revalidate(
                    &self.state.current_uri,
                    self.state.blocked(),
                    &self.config.home_url,
                    now,
                );
                self.apply_guard_effects(outcome.effects, &mut effects);
            }
        }

        effects
    }

    /// Snapshot of what the shell should display at `now`.
    pub fn presentation(&self, now: &DateTime<FixedOffset>) -> Presentation {
        let override_active = self.window.is_active(now);
        let blocked = match &self.state.blocked_target {
            Some(url) if !override_active && !self.state.offline => Some(BlockedNotice {
                url: url.clone(),
                offer: self.window.offer(now),
            }),
            _ => None,
        };
        Presentation {
            current_uri: self.state.current_uri.clone(),
            address_text: self.state.address_text.clone(),
            can_go_back: self.state.can_go_back,
            can_go_forward: self.state.can_go_forward,
            blocked,
            offline: self.state.offline,
            override_timer: self.window.timer_text(now),
            progress: self.state.visible_progress(),
            secure: self.state.is_secure(),
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn policy(&self) -> &PolicyStore {
        &self.policy
    }

    pub fn window(&self) -> &OverrideWindow {
        &self.window
    }

    pub fn session(&self) -> &SessionContinuity {
        &self.session
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    fn guard(&self) -> NavigationGuard<'_> {
        NavigationGuard::new(&self.policy, &self.window)
    }

    /// Back / forward / reload: run the guard, then the web-view command if
    /// the action is currently possible.
    fn guarded_action(
        &mut self,
        action: Option<ShellCommand>,
        now: &DateTime<FixedOffset>,
        effects: &mut Vec<Effect>,
    ) {
        let outcome = self.guard().user_action(
            &self.state.current_uri,
            self.state.blocked(),
            now,
        );
        let allowed = outcome.is_allowed();
        self.apply_guard_effects(outcome.effects, effects);
        if allowed {
            if let Some(action) = action {
                effects.push(command(action));
            }
        }
    }

    fn hardware_back(&mut self, now: &DateTime<FixedOffset>, effects: &mut Vec<Effect>) {
        if self.state.can_go_back {
            self.guarded_action(Some(ShellCommand::GoBack), now, effects);
            return;
        }
        let now_ms = now.timestamp_millis();
        match self.state.last_back_press_ms {
            Some(prev) if now_ms - prev < self.config.exit_press_window_ms => {
                self.state.last_back_press_ms = None;
                tracing::info!("Exit requested by double back press");
                effects.push(command(ShellCommand::ExitApp));
            }
            _ => self.state.last_back_press_ms = Some(now_ms),
        }
    }

    fn go_home(&mut self, effects: &mut Vec<Effect>) {
        self.state.blocked_target = None;
        let home = self.config.home_url.clone();
        self.load(home, effects);
    }

    fn load(&mut self, url: String, effects: &mut Vec<Effect>) {
        self.state.navigate_to(&url);
        effects.push(command(ShellCommand::Load { url }));
    }

    fn apply_guard_effects(&mut self, guard_effects: Vec<GuardEffect>, effects: &mut Vec<Effect>) {
        for effect in guard_effects {
            match effect {
                GuardEffect::SetBlocked(url) => self.state.blocked_target = Some(url),
                GuardEffect::ClearBlocked => self.state.blocked_target = None,
                GuardEffect::LoadHome => {
                    let home = self.config.home_url.clone();
                    self.load(home, effects);
                }
                GuardEffect::Load(url) => self.load(url, effects),
            }
        }
    }
}

fn command(command: ShellCommand) -> Effect {
    Effect::Command(command)
}

fn push_writes(writes: Vec<StoreOp>, effects: &mut Vec<Effect>) {
    effects.extend(writes.into_iter().map(Effect::Store));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::override_window::OverrideOffer;
    use crate::storage::keys;
    use chrono::{Duration, TimeZone};

    const HOME: &str = "https://duckduckgo.com/";

    fn t0() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 14, 12, 0, 0)
            .unwrap()
    }

    fn controller() -> ShellController {
        let mut c = ShellController::new(ShellConfig::default());
        c.apply_policy(vec!["example.com".to_string()], PolicyOrigin::Remote);
        c
    }

    fn commands(effects: &[Effect]) -> Vec<ShellCommand> {
        effects.iter().filter_map(|e| e.as_command().cloned()).collect()
    }

    fn load(url: &str) -> ShellCommand {
        ShellCommand::Load {
            url: url.to_string(),
        }
    }

    #[test]
    fn test_intercept_blocks_banned_url() {
        let mut c = controller();
        let effects = c.handle(
            ShellEvent::NavigationRequested {
                url: "https://www.example.com/feed".to_string(),
                request_id: Some("7".to_string()),
            },
            &t0(),
        );
        assert_eq!(
            commands(&effects),
            vec![ShellCommand::ResolveNavigation {
                request_id: Some("7".to_string()),
                url: "https://www.example.com/feed".to_string(),
                allow: false,
            }]
        );
        assert_eq!(c.state().blocked(), Some("https://www.example.com/feed"));

        let notice = c.presentation(&t0()).blocked.unwrap();
        assert_eq!(notice.offer, OverrideOffer::Available);
    }

    #[test]
    fn test_allowed_intercept_clears_block() {
        let mut c = controller();
        c.handle(
            ShellEvent::NavigationRequested {
                url: "https://example.com".to_string(),
                request_id: None,
            },
            &t0(),
        );
        c.handle(
            ShellEvent::NavigationRequested {
                url: "https://rust-lang.org".to_string(),
                request_id: None,
            },
            &t0(),
        );
        assert_eq!(c.state().blocked(), None);
    }

    #[test]
    fn test_cache_policy_after_remote_is_ignored() {
        let mut c = controller();
        let effects = c.apply_policy(vec!["other.test".to_string()], PolicyOrigin::Cache);
        assert!(effects.is_empty());
        assert!(c.policy().is_banned("https://example.com"));
        assert!(!c.policy().is_banned("https://other.test"));
    }

    #[test]
    fn test_remote_policy_writes_cache() {
        let mut c = ShellController::new(ShellConfig::default());
        let effects = c.apply_policy(vec!["a.test".to_string()], PolicyOrigin::Remote);
        assert_eq!(
            effects,
            vec![Effect::Store(StoreOp::set(keys::BANNED_CACHE, r#"["a.test"]"#))]
        );
    }

    #[test]
    fn test_back_only_when_possible_and_allowed() {
        let mut c = controller();
        assert!(commands(&c.handle(ShellEvent::Back, &t0())).is_empty());

        c.handle(
            ShellEvent::NavigationStateChanged {
                url: "https://ok.test".to_string(),
                can_go_back: true,
                can_go_forward: false,
            },
            &t0(),
        );
        assert_eq!(commands(&c.handle(ShellEvent::Back, &t0())), vec![ShellCommand::GoBack]);
        assert!(commands(&c.handle(ShellEvent::Forward, &t0())).is_empty());
    }

    #[test]
    fn test_user_action_cannot_pass_pending_block() {
        let mut c = controller();
        c.handle(
            ShellEvent::NavigationStateChanged {
                url: "https://ok.test".to_string(),
                can_go_back: true,
                can_go_forward: true,
            },
            &t0(),
        );
        c.handle(
            ShellEvent::NavigationRequested {
                url: "https://example.com".to_string(),
                request_id: None,
            },
            &t0(),
        );
        for event in [
            ShellEvent::Back,
            ShellEvent::Forward,
            ShellEvent::Reload,
            ShellEvent::PullToRefresh,
        ] {
            assert!(commands(&c.handle(event, &t0())).is_empty());
        }
        assert_eq!(c.state().blocked(), Some("https://example.com"));
    }

    #[test]
    fn test_navigation_state_change_injects_sync_script() {
        let mut c = controller();
        let effects = c.handle(
            ShellEvent::NavigationStateChanged {
                url: "https://ok.test/page".to_string(),
                can_go_back: false,
                can_go_forward: false,
            },
            &t0(),
        );
        assert_eq!(
            commands(&effects),
            vec![ShellCommand::InjectScript {
                script: SYNC_STORAGE_SCRIPT.to_string()
            }]
        );
        assert_eq!(c.state().address_text, "https://ok.test/page");
    }

    #[test]
    fn test_address_submission() {
        let mut c = controller();
        let effects = c.handle(
            ShellEvent::AddressSubmitted {
                text: "rust-lang.org".to_string(),
            },
            &t0(),
        );
        assert_eq!(commands(&effects), vec![load("https://rust-lang.org")]);

        let effects = c.handle(
            ShellEvent::AddressSubmitted {
                text: "   ".to_string(),
            },
            &t0(),
        );
        assert_eq!(commands(&effects), vec![load(HOME)]);

        let effects = c.handle(
            ShellEvent::AddressSubmitted {
                text: "best pizza".to_string(),
            },
            &t0(),
        );
        assert_eq!(
            commands(&effects),
            vec![load(
                "https://duckduckgo.com/best%20pizza&rpl=1&ia=web&assist=false"
            )]
        );
    }

    #[test]
    fn test_hardware_back_double_press_exits() {
        let mut c = controller();
        let t = t0();
        assert!(commands(&c.handle(ShellEvent::HardwareBack, &t)).is_empty());
        assert_eq!(
            commands(&c.handle(ShellEvent::HardwareBack, &(t + Duration::milliseconds(300)))),
            vec![ShellCommand::ExitApp]
        );

        // Too slow: second press only re-arms
        let later = t + Duration::seconds(10);
        assert!(commands(&c.handle(ShellEvent::HardwareBack, &later)).is_empty());
        assert!(commands(
            &c.handle(ShellEvent::HardwareBack, &(later + Duration::milliseconds(450)))
        )
        .is_empty());
    }

    #[test]
    fn test_deep_link_routes() {
        let mut c = controller();
        let effects = c.handle(
            ShellEvent::DeepLink {
                url: "exp://192.168.1.5:8081".to_string(),
            },
            &t0(),
        );
        assert_eq!(commands(&effects), vec![load(HOME)]);

        let effects = c.handle(
            ShellEvent::DeepLink {
                url: "ftp://files.ok.test/report".to_string(),
            },
            &t0(),
        );
        assert!(effects.is_empty());

        let effects = c.handle(
            ShellEvent::DeepLink {
                url: "example.com/promo".to_string(),
            },
            &t0(),
        );
        assert!(effects.is_empty());
        assert_eq!(c.state().blocked(), Some("https://example.com/promo"));

        let effects = c.handle(
            ShellEvent::DeepLink {
                url: "news.ok.test".to_string(),
            },
            &t0(),
        );
        assert_eq!(commands(&effects), vec![load("https://news.ok.test")]);
        assert_eq!(c.state().blocked(), None);
    }

    #[test]
    fn test_offline_hides_blocked_notice() {
        let mut c = controller();
        c.handle(
            ShellEvent::NavigationRequested {
                url: "https://example.com".to_string(),
                request_id: None,
            },
            &t0(),
        );
        c.handle(ShellEvent::ConnectivityChanged { reachable: false }, &t0());
        let p = c.presentation(&t0());
        assert!(p.offline);
        assert!(p.blocked.is_none());
        assert_eq!(c.state().blocked(), Some("https://example.com"));

        c.handle(ShellEvent::ConnectivityChanged { reachable: true }, &t0());
        assert!(c.presentation(&t0()).blocked.is_some());
    }

    #[test]
    fn test_load_progress_is_clamped() {
        let mut c = controller();
        c.handle(ShellEvent::LoadProgress { progress: 0.5 }, &t0());
        assert_eq!(c.presentation(&t0()).progress, Some(0.5));
        c.handle(ShellEvent::LoadProgress { progress: 7.0 }, &t0());
        assert_eq!(c.state().load_progress, 1.0);
        c.handle(ShellEvent::LoadProgress { progress: f64::NAN }, &t0());
        assert_eq!(c.state().load_progress, 0.0);
        c.handle(ShellEvent::LoadEnd, &t0());
        assert_eq!(c.presentation(&t0()).progress, None);
    }

    #[test]
    fn test_page_message_persists_and_rehydrates() {
        let mut c = controller();
        let effects = c.handle(
            ShellEvent::PageMessage {
                data: r#"{"type":"storageSync","cookies":"sid=1","session":{}}"#.to_string(),
            },
            &t0(),
        );
        let stored: Vec<&str> = effects.iter().filter_map(|e| e.as_store()).map(|op| op.key()).collect();
        assert_eq!(stored, vec![keys::COOKIES, keys::SESSION]);
        assert!(matches!(
            commands(&effects).as_slice(),
            [ShellCommand::SetHydrationScript { script }] if script.contains("`sid=1`")
        ));

        let effects = c.handle(
            ShellEvent::PageMessage {
                data: r#"{"type":"ping"}"#.to_string(),
            },
            &t0(),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_restore_session_installs_script() {
        let mut c = controller();
        let effects = c.restore_session(SessionSnapshot {
            cookies: "a=b".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            commands(&effects).as_slice(),
            [ShellCommand::SetHydrationScript { script }] if script.contains("`a=b`")
        ));
    }

    #[test]
    fn test_restored_active_override_shows_timer() {
        let mut c = controller();
        let now = t0();
        let grant = OverrideGrant {
            granted_on: "2026-03-14".to_string(),
            expires_at_ms: (now + Duration::minutes(12)).timestamp_millis(),
        };
        c.restore_override(Some(grant), Some("2026-03-14".to_string()), &now);
        let p = c.presentation(&now);
        assert_eq!(p.override_timer.as_deref(), Some("12:00"));
        assert!(!c.window().is_available(&now));
    }
}
