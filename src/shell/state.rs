//! Mutable UI-facing state owned by the shell controller.

/// Web view and chrome state. Access-control state lives in the policy store
/// and override window; this only tracks what the shell shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellState {
    /// URL currently loaded or requested
    pub current_uri: String,
    /// Address bar text
    pub address_text: String,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// URL presented as denied, if any
    pub blocked_target: Option<String>,
    /// Last reported load fraction, 0..=1
    pub load_progress: f64,
    pub offline: bool,
    /// Previous unconsumed hardware-back press, epoch ms
    pub last_back_press_ms: Option<i64>,
}

impl ShellState {
    pub fn new(home_url: &str) -> Self {
        Self {
            current_uri: home_url.to_string(),
            address_text: home_url.to_string(),
            can_go_back: false,
            can_go_forward: false,
            blocked_target: None,
            load_progress: 0.0,
            offline: false,
            last_back_press_ms: None,
        }
    }

    /// Point the shell at `url`, keeping the address bar in step.
    pub fn navigate_to(&mut self, url: &str) {
        self.current_uri = url.to_string();
        self.address_text = url.to_string();
    }

    pub fn blocked(&self) -> Option<&str> {
        self.blocked_target.as_deref()
    }

    /// Progress is only shown mid-load.
    pub fn visible_progress(&self) -> Option<f64> {
        (self.load_progress > 0.0 && self.load_progress < 1.0).then_some(self.load_progress)
    }

    pub fn is_secure(&self) -> bool {
        self.current_uri
            .get(..8)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("https://"))
    }
}
