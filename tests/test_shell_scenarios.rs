//! End-to-end scenarios against the shell controller with a simulated clock.

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use focusshell::config::ShellConfig;
use focusshell::override_window::OverrideOffer;
use focusshell::policy::PolicyOrigin;
use focusshell::shell::{Effect, ShellCommand, ShellController, ShellEvent};
use focusshell::storage::{keys, StoreOp};

const HOME: &str = "https://duckduckgo.com/";

fn t0() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(2026, 6, 20, 14, 0, 0)
        .unwrap()
}

fn shell_with(banned: &[&str]) -> ShellController {
    let mut shell = ShellController::new(ShellConfig::default());
    shell.apply_policy(
        banned.iter().map(|s| s.to_string()).collect(),
        PolicyOrigin::Remote,
    );
    shell
}

fn commands(effects: &[Effect]) -> Vec<ShellCommand> {
    effects.iter().filter_map(|e| e.as_command().cloned()).collect()
}

fn writes(effects: &[Effect]) -> Vec<StoreOp> {
    effects.iter().filter_map(|e| e.as_store().cloned()).collect()
}

fn request(url: &str) -> ShellEvent {
    ShellEvent::NavigationRequested {
        url: url.to_string(),
        request_id: None,
    }
}

fn loaded(url: &str) -> ShellEvent {
    ShellEvent::NavigationStateChanged {
        url: url.to_string(),
        can_go_back: true,
        can_go_forward: false,
    }
}

fn allowed(effects: &[Effect]) -> Option<bool> {
    commands(effects).into_iter().find_map(|c| match c {
        ShellCommand::ResolveNavigation { allow, .. } => Some(allow),
        _ => None,
    })
}

fn home_loads(effects: &[Effect]) -> usize {
    commands(effects)
        .iter()
        .filter(|c| matches!(c, ShellCommand::Load { url } if url == HOME))
        .count()
}

#[test]
fn test_block_grant_expire_scenario() {
    let mut shell = shell_with(&["example.com"]);
    let start = t0();

    // Blocked navigation
    let effects = shell.handle(request("http://example.com/x"), &start);
    assert_eq!(allowed(&effects), Some(false));
    assert_eq!(shell.state().blocked(), Some("http://example.com/x"));
    assert_eq!(
        shell.presentation(&start).blocked.map(|n| n.offer),
        Some(OverrideOffer::Available)
    );

    // Grant resumes to the blocked target
    let effects = shell.handle(ShellEvent::OverrideRequested, &start);
    assert_eq!(
        commands(&effects),
        vec![ShellCommand::Load {
            url: "http://example.com/x".to_string()
        }]
    );
    assert_eq!(
        writes(&effects).iter().map(|op| op.key()).collect::<Vec<_>>(),
        vec![keys::OVERRIDE_GRANT, keys::LAST_OVERRIDE_DATE]
    );
    assert_eq!(shell.state().blocked(), None);
    assert_eq!(shell.state().current_uri, "http://example.com/x");

    let effects = shell.handle(request("http://example.com/x"), &start);
    assert_eq!(allowed(&effects), Some(true));
    shell.handle(loaded("http://example.com/x"), &start);

    // Thirty minutes of clock ticks: exactly one return home
    let mut home_redirects = 0;
    let mut t = start;
    while t <= start + Duration::minutes(31) {
        t += Duration::seconds(1);
        let effects = shell.handle(ShellEvent::ClockTick, &t);
        home_redirects += home_loads(&effects);
        if home_loads(&effects) > 0 {
            assert_eq!(t, start + Duration::minutes(30));
            assert_eq!(
                writes(&effects),
                vec![StoreOp::remove(keys::OVERRIDE_GRANT)]
            );
        }
    }
    assert_eq!(home_redirects, 1);
    assert_eq!(shell.state().blocked(), None);
    assert_eq!(shell.state().current_uri, HOME);
    assert_eq!(shell.window().last_date(), Some("2026-06-20"));

    // No second grant for the rest of the day
    let late = start + Duration::hours(9) + Duration::minutes(59);
    assert!(!shell.window().is_available(&late));
    let effects = shell.handle(ShellEvent::OverrideRequested, &late);
    assert!(effects.is_empty());
    let effects = shell.handle(request("http://example.com/x"), &late);
    assert_eq!(allowed(&effects), Some(false));
    assert_eq!(
        shell.presentation(&late).blocked.map(|n| n.offer),
        Some(OverrideOffer::UsedToday)
    );
}

#[test]
fn test_override_allows_everything_while_active() {
    let mut shell = shell_with(&["example.com", "bad.test"]);
    shell.handle(ShellEvent::OverrideRequested, &t0());

    for url in ["https://example.com", "https://www.bad.test/a", "https://fine.test"] {
        let effects = shell.handle(request(url), &t0());
        assert_eq!(allowed(&effects), Some(true), "{}", url);
    }
    assert!(shell.presentation(&t0()).blocked.is_none());
    assert_eq!(shell.presentation(&t0()).override_timer.as_deref(), Some("30:00"));
}

#[test]
fn test_double_tap_locks_and_goes_home() {
    let mut shell = shell_with(&["example.com"]);
    let start = t0();
    shell.handle(ShellEvent::OverrideRequested, &start);

    let tap = start + Duration::minutes(3);
    assert!(shell.handle(ShellEvent::OverrideTimerPressed, &tap).is_empty());
    let effects = shell.handle(
        ShellEvent::OverrideTimerPressed,
        &(tap + Duration::milliseconds(200)),
    );

    assert_eq!(home_loads(&effects), 1);
    assert!(writes(&effects).contains(&StoreOp::remove(keys::OVERRIDE_GRANT)));
    assert!(writes(&effects).contains(&StoreOp::set(keys::LAST_OVERRIDE_DATE, "2026-06-20")));
    assert!(!shell.window().is_active(&tap));
    assert!(!shell.window().is_available(&tap));

    // The lock was manual: the clock never reports an expiry afterwards
    let effects = shell.handle(ShellEvent::ClockTick, &(tap + Duration::seconds(1)));
    assert!(effects.is_empty());
}

#[test]
fn test_slow_or_single_taps_do_nothing() {
    let mut shell = shell_with(&[]);
    let start = t0();
    shell.handle(ShellEvent::OverrideRequested, &start);

    let tap = start + Duration::minutes(1);
    assert!(shell.handle(ShellEvent::OverrideTimerPressed, &tap).is_empty());
    assert!(shell
        .handle(
            ShellEvent::OverrideTimerPressed,
            &(tap + Duration::milliseconds(400))
        )
        .is_empty());
    assert!(shell.window().is_active(&(tap + Duration::seconds(1))));
}

#[test]
fn test_revalidation_catches_blocklist_change_after_load() {
    let mut shell = shell_with(&[]);
    let t = t0();

    shell.handle(request("https://feed.test/today"), &t);
    shell.handle(loaded("https://feed.test/today"), &t);
    assert!(shell.handle(ShellEvent::RevalidateTick, &t).is_empty());

    // Blocklist refresh lands after the page loaded
    shell.apply_policy(vec!["feed.test".to_string()], PolicyOrigin::Remote);
    let effects = shell.handle(ShellEvent::RevalidateTick, &(t + Duration::seconds(5)));

    assert_eq!(home_loads(&effects), 1);
    assert_eq!(shell.state().blocked(), Some("https://feed.test/today"));
    assert_eq!(shell.state().current_uri, HOME);
}

#[test]
fn test_revalidation_skipped_while_override_active() {
    let mut shell = shell_with(&["example.com"]);
    let t = t0();
    shell.handle(ShellEvent::OverrideRequested, &t);
    shell.handle(loaded("https://example.com/"), &t);

    let effects = shell.handle(ShellEvent::RevalidateTick, &(t + Duration::seconds(5)));
    assert!(effects.is_empty());
    assert_eq!(shell.state().current_uri, "https://example.com/");
}

#[test]
fn test_intercept_and_revalidation_agree_on_latest_policy() {
    let mut shell = shell_with(&[]);
    let url = "https://swing.test/page";
    let lists: [&[&str]; 4] = [&["swing.test"], &[], &["other.test"], &["www.swing.test"]];

    for (i, list) in lists.iter().enumerate() {
        let t = t0() + Duration::seconds(5 * i as i64);
        shell.apply_policy(list.iter().map(|s| s.to_string()).collect(), PolicyOrigin::Remote);

        let intercept_allowed = allowed(&shell.handle(request(url), &t)).unwrap();
        shell.handle(loaded(url), &t);
        let effects = shell.handle(ShellEvent::RevalidateTick, &t);
        let revalidate_blocked = home_loads(&effects) == 1;

        assert_eq!(
            intercept_allowed, !revalidate_blocked,
            "policy #{} must drive both checks",
            i
        );
        assert_eq!(intercept_allowed, !shell.policy().is_banned(url));
    }
}

#[test]
fn test_go_home_clears_block() {
    let mut shell = shell_with(&["example.com"]);
    shell.handle(request("https://example.com"), &t0());
    let effects = shell.handle(ShellEvent::GoHome, &t0());

    assert_eq!(home_loads(&effects), 1);
    assert_eq!(shell.state().blocked(), None);
    assert_eq!(shell.state().address_text, HOME);
}

#[test]
fn test_banned_deep_link_is_presented_not_loaded() {
    let mut shell = shell_with(&["example.com"]);
    let effects = shell.handle(
        ShellEvent::DeepLink {
            url: " https://www.example.com/deal ".to_string(),
        },
        &t0(),
    );
    assert!(commands(&effects).is_empty());
    assert_eq!(shell.state().blocked(), Some("https://www.example.com/deal"));

    // Granting resumes to it
    let effects = shell.handle(ShellEvent::OverrideRequested, &t0());
    assert_eq!(
        commands(&effects),
        vec![ShellCommand::Load {
            url: "https://www.example.com/deal".to_string()
        }]
    );
}

#[test]
fn test_dev_tooling_launch_urls_go_home() {
    let mut shell = shell_with(&[]);
    for url in [
        "exp://127.0.0.1:19000",
        "http://localhost:8081/index.bundle",
        "https://u.expo.dev/update",
        "http://172.20.1.4:19006",
    ] {
        let effects = shell.handle(
            ShellEvent::DeepLink {
                url: url.to_string(),
            },
            &t0(),
        );
        assert_eq!(home_loads(&effects), 1, "{}", url);
    }
}
