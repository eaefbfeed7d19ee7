//! Inbound events and outbound commands of the shell controller.
//!
//! Everything the web view, the OS or the timers report arrives as a
//! `ShellEvent`; everything the controller needs done comes back as an
//! `Effect`. Both event and command types are JSON-tagged by `type` so they
//! can cross the JSON-lines bridge unchanged.

use crate::override_window::OverrideOffer;
use crate::storage::StoreOp;
use serde::{Deserialize, Serialize};

/// Something that happened outside the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellEvent {
    /// The web view is about to load `url` and waits for a verdict.
    NavigationRequested {
        url: String,
        /// Echoed back in the matching `ResolveNavigation`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    /// The web view finished a navigation-state change.
    NavigationStateChanged {
        url: String,
        #[serde(default)]
        can_go_back: bool,
        #[serde(default)]
        can_go_forward: bool,
    },
    LoadProgress {
        progress: f64,
    },
    LoadEnd,
    /// Raw postMessage payload from in-page script.
    PageMessage {
        data: String,
    },
    /// Text submitted from the address bar.
    AddressSubmitted {
        text: String,
    },
    Back,
    Forward,
    Reload,
    PullToRefresh,
    /// OS back button (Android style).
    HardwareBack,
    GoHome,
    /// The user asked for today's override.
    OverrideRequested,
    /// The countdown control was activated.
    OverrideTimerPressed,
    /// External URL delivered to the app (launch URL or later delivery).
    DeepLink {
        url: String,
    },
    ConnectivityChanged {
        reachable: bool,
    },
    /// Override clock sample (1 s).
    ClockTick,
    /// Blocklist re-check of the loaded page (5 s).
    RevalidateTick,
}

impl ShellEvent {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ShellEvent::NavigationRequested { .. } => "navigation_requested",
            ShellEvent::NavigationStateChanged { .. } => "navigation_state_changed",
            ShellEvent::LoadProgress { .. } => "load_progress",
            ShellEvent::LoadEnd => "load_end",
            ShellEvent::PageMessage { .. } => "page_message",
            ShellEvent::AddressSubmitted { .. } => "address_submitted",
            ShellEvent::Back => "back",
            ShellEvent::Forward => "forward",
            ShellEvent::Reload => "reload",
            ShellEvent::PullToRefresh => "pull_to_refresh",
            ShellEvent::HardwareBack => "hardware_back",
            ShellEvent::GoHome => "go_home",
            ShellEvent::OverrideRequested => "override_requested",
            ShellEvent::OverrideTimerPressed => "override_timer_pressed",
            ShellEvent::DeepLink { .. } => "deep_link",
            ShellEvent::ConnectivityChanged { .. } => "connectivity_changed",
            ShellEvent::ClockTick => "clock_tick",
            ShellEvent::RevalidateTick => "revalidate_tick",
        }
    }
}

/// Instruction for the web view / host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShellCommand {
    /// Answer to a `NavigationRequested`. `allow: false` cancels the load.
    ResolveNavigation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
        url: String,
        allow: bool,
    },
    Load {
        url: String,
    },
    GoBack,
    GoForward,
    Reload,
    /// Run a script in the loaded page.
    InjectScript {
        script: String,
    },
    /// Script to run before content loads on every navigation.
    SetHydrationScript {
        script: String,
    },
    ExitApp,
    /// Latest UI state.
    Present {
        presentation: Presentation,
    },
}

/// Output of one controller transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Command(ShellCommand),
    /// Best-effort persistence; never awaited by the controller.
    Store(StoreOp),
}

impl Effect {
    pub fn as_command(&self) -> Option<&ShellCommand> {
        match self {
            Effect::Command(command) => Some(command),
            Effect::Store(_) => None,
        }
    }

    pub fn as_store(&self) -> Option<&StoreOp> {
        match self {
            Effect::Store(op) => Some(op),
            Effect::Command(_) => None,
        }
    }
}

/// The blocked overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedNotice {
    pub url: String,
    pub offer: OverrideOffer,
}

/// What the shell should currently display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub current_uri: String,
    pub address_text: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// Present only while a target is blocked, no override is active and the
    /// shell is online
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<BlockedNotice>,
    pub offline: bool,
    /// `MM:SS` countdown while an override is active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_timer: Option<String>,
    /// Load fraction, shown only mid-load
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Loaded page is served over https
    pub secure: bool,
}
