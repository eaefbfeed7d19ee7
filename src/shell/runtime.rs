//! Shell runtime: the event loop around a `ShellController`.
//!
//! One loop owns the controller and feeds it, one event at a time:
//! - events from the host (web view, OS, address bar)
//! - the override clock tick and the re-validation tick
//! - boot data (persisted state, then the remote blocklist) from a boot task
//!
//! Store effects go to a single writer task in order, fire-and-forget.
//! Commands go to the `CommandSink`, followed by a `Present` whenever the
//! presentation changed.

use crate::config::ShellConfig;
use crate::override_window::{Clock, OverrideGrant, OverrideWindow};
use crate::policy::{PolicyOrigin, PolicySource, PolicyStore};
use crate::session::{SessionContinuity, SessionSnapshot};
use crate::shell::controller::ShellController;
use crate::shell::events::{Effect, Presentation, ShellCommand, ShellEvent};
use crate::storage::{self, KeyValueStore, StoreOp};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Receives the controller's commands (the web view / host side).
pub trait CommandSink: Send {
    fn deliver(&mut self, command: ShellCommand);
}

impl CommandSink for mpsc::UnboundedSender<ShellCommand> {
    fn deliver(&mut self, command: ShellCommand) {
        if self.send(command).is_err() {
            tracing::debug!("Command sink closed, dropping command");
        }
    }
}

/// Data produced by the boot task.
#[derive(Debug, Clone)]
pub enum BootMessage {
    /// Everything read back from the store.
    Restored {
        session: SessionSnapshot,
        grant: Option<OverrideGrant>,
        last_date: Option<String>,
        cached_policy: Vec<String>,
    },
    /// The remote blocklist fetched once at boot.
    RemotePolicy(Vec<String>),
}

/// What woke the loop.
enum Wake {
    Event(ShellEvent),
    Boot(BootMessage),
    BootDone,
    Shutdown,
}

pub struct ShellRuntime {
    controller: ShellController,
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn PolicySource>,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
}

impl ShellRuntime {
    pub fn new(
        config: ShellConfig,
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn PolicySource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            controller: ShellController::new(config),
            store,
            source,
            clock,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops `run` when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Run until the token is cancelled or the event channel closes.
    /// Pending store writes are flushed before returning the controller.
    pub async fn run<S: CommandSink>(
        self,
        mut events: mpsc::Receiver<ShellEvent>,
        mut sink: S,
    ) -> ShellController {
        let ShellRuntime {
            mut controller,
            store,
            source,
            clock,
            shutdown,
        } = self;

        let (boot_tx, mut boot_rx) = mpsc::channel(2);
        let boot = tokio::spawn(boot_task(store.clone(), source, boot_tx));
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(store, write_rx));

        let config = controller.config().clone();
        let mut clock_tick = interval_at(Instant::now() + config.clock_tick, config.clock_tick);
        clock_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut revalidate = interval_at(
            Instant::now() + config.revalidate_interval,
            config.revalidate_interval,
        );
        revalidate.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut boot_open = true;
        let mut presented: Option<Presentation> = None;
        present(&controller, &clock.now(), &mut presented, &mut sink);

        loop {
            let wake = tokio::select! {
                biased;
                _ = shutdown.cancelled() => Wake::Shutdown,
                event = events.recv() => match event {
                    Some(event) => Wake::Event(event),
                    None => Wake::Shutdown,
                },
                message = boot_rx.recv(), if boot_open => match message {
                    Some(message) => Wake::Boot(message),
                    None => Wake::BootDone,
                },
                _ = clock_tick.tick() => Wake::Event(ShellEvent::ClockTick),
                _ = revalidate.tick() => Wake::Event(ShellEvent::RevalidateTick),
            };

            let now = clock.now();
            let effects = match wake {
                Wake::Shutdown => break,
                Wake::BootDone => {
                    boot_open = false;
                    continue;
                }
                Wake::Boot(message) => apply_boot(&mut controller, message, &now),
                Wake::Event(event) => controller.handle(event, &now),
            };

            for effect in effects {
                match effect {
                    Effect::Command(command) => sink.deliver(command),
                    Effect::Store(op) => {
                        if write_tx.send(op).is_err() {
                            tracing::warn!("Store writer stopped, dropping write");
                        }
                    }
                }
            }
            present(&controller, &now, &mut presented, &mut sink);
        }

        tracing::debug!("Shell runtime shutting down");
        boot.abort();
        drop(write_tx);
        if let Err(e) = writer.await {
            tracing::warn!("Store writer ended abnormally: {}", e);
        }
        controller
    }
}

/// Apply boot data to the controller.
pub fn apply_boot(
    controller: &mut ShellController,
    message: BootMessage,
    now: &chrono::DateTime<chrono::FixedOffset>,
) -> Vec<Effect> {
    match message {
        BootMessage::Restored {
            session,
            grant,
            last_date,
            cached_policy,
        } => {
            let mut effects = controller.restore_session(session);
            controller.restore_override(grant, last_date, now);
            if !cached_policy.is_empty() {
                effects.extend(controller.apply_policy(cached_policy, PolicyOrigin::Cache));
            }
            effects
        }
        BootMessage::RemotePolicy(entries) => controller.apply_policy(entries, PolicyOrigin::Remote),
    }
}

/// Load persisted state, then fetch the remote blocklist once.
async fn boot_task(
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn PolicySource>,
    tx: mpsc::Sender<BootMessage>,
) {
    let session = SessionContinuity::load_persisted(store.as_ref()).await;
    let (grant, last_date) = OverrideWindow::load_persisted(store.as_ref()).await;
    let cached_policy = PolicyStore::load_cached(store.as_ref()).await;
    let restored = BootMessage::Restored {
        session,
        grant,
        last_date,
        cached_policy,
    };
    if tx.send(restored).await.is_err() {
        return;
    }

    match source.fetch().await {
        Ok(entries) => {
            tracing::info!("Fetched blocklist ({} entries)", entries.len());
            let _ = tx.send(BootMessage::RemotePolicy(entries)).await;
        }
        Err(e) => tracing::warn!("Blocklist refresh failed, keeping cached list: {}", e),
    }
}

async fn write_loop(store: Arc<dyn KeyValueStore>, mut rx: mpsc::UnboundedReceiver<StoreOp>) {
    while let Some(op) = rx.recv().await {
        storage::best_effort(store.as_ref(), op).await;
    }
}

fn present<S: CommandSink>(
    controller: &ShellController,
    now: &chrono::DateTime<chrono::FixedOffset>,
    presented: &mut Option<Presentation>,
    sink: &mut S,
) {
    let presentation = controller.presentation(now);
    if presented.as_ref() == Some(&presentation) {
        return;
    }
    *presented = Some(presentation.clone());
    sink.deliver(ShellCommand::Present { presentation });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::override_window::day_key_of;
    use crate::storage::keys;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_apply_boot_restores_everything() {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2026, 7, 1, 8, 0, 0)
            .unwrap();
        let mut controller = ShellController::new(ShellConfig::default());
        let effects = apply_boot(
            &mut controller,
            BootMessage::Restored {
                session: SessionSnapshot {
                    cookies: "a=1".to_string(),
                    ..Default::default()
                },
                grant: None,
                last_date: Some(day_key_of(&now)),
                cached_policy: vec!["bad.test".to_string()],
            },
            &now,
        );

        assert!(matches!(
            effects.as_slice(),
            [Effect::Command(ShellCommand::SetHydrationScript { .. })]
        ));
        assert!(controller.policy().is_banned("https://bad.test"));
        assert_eq!(controller.policy().origin(), PolicyOrigin::Cache);
        assert!(!controller.window().is_available(&now));

        let effects = apply_boot(
            &mut controller,
            BootMessage::RemotePolicy(vec!["worse.test".to_string()]),
            &now,
        );
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].as_store().map(|op| op.key()), Some(keys::BANNED_CACHE));
        assert!(!controller.policy().is_banned("https://bad.test"));
    }
}
