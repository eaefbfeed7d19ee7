//! Shell configuration.
//!
//! Parsed from an optional YAML file into `ShellConfig`. Every field has a
//! default, so an empty file (or no file at all) gives the stock shell.
//!
//! # Example config file:
//! ```yaml
//! home_url: https://duckduckgo.com/
//! policy_endpoint: https://example.org/banned_urls.json
//! day_boundary: local
//! override:
//!   enabled: true
//!   duration_minutes: 30
//!   lock_tap_window_ms: 350
//! ```

use crate::override_window::{DayBoundary, OverrideSettings};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// File name looked up from the working directory upwards.
pub const CONFIG_FILE_NAME: &str = ".focusshell.yaml";

pub const DEFAULT_HOME_URL: &str = "https://duckduckgo.com/";
pub const DEFAULT_POLICY_ENDPOINT: &str =
    "https://cdn.bizbazboz.uk/api/v1/focusbrowser/banned_urls.json";

/// Longest accepted override; anything longer outlasts the daily lock.
const MAX_OVERRIDE_MINUTES: i64 = 24 * 60;

/// Raw YAML representation before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    home_url: Option<String>,
    #[serde(default)]
    search_base: Option<String>,
    #[serde(default)]
    policy_endpoint: Option<String>,
    #[serde(default)]
    fetch_timeout_secs: Option<u64>,
    #[serde(default, rename = "override")]
    override_: Option<RawOverride>,
    #[serde(default)]
    exit_press_window_ms: Option<i64>,
    #[serde(default)]
    clock_tick_ms: Option<u64>,
    #[serde(default)]
    revalidate_interval_ms: Option<u64>,
    #[serde(default)]
    day_boundary: Option<DayBoundary>,
    #[serde(default)]
    state_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOverride {
    #[serde(default)]
    enabled: Option<bool>,
    #[serde(default)]
    duration_minutes: Option<i64>,
    #[serde(default)]
    lock_tap_window_ms: Option<i64>,
}

/// Validated configuration for one shell instance.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub home_url: String,
    /// Search URL prefix; the encoded query is appended directly
    pub search_base: String,
    pub policy_endpoint: String,
    pub fetch_timeout: Duration,
    pub override_settings: OverrideSettings,
    /// Two hardware-back presses closer than this exit the app
    pub exit_press_window_ms: i64,
    /// Override clock sampling period
    pub clock_tick: Duration,
    /// Blocklist re-validation period for the loaded page
    pub revalidate_interval: Duration,
    pub day_boundary: DayBoundary,
    /// Where the file store keeps `state.json`
    pub state_dir: PathBuf,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            home_url: DEFAULT_HOME_URL.to_string(),
            search_base: DEFAULT_HOME_URL.to_string(),
            policy_endpoint: DEFAULT_POLICY_ENDPOINT.to_string(),
            fetch_timeout: Duration::from_secs(10),
            override_settings: OverrideSettings::default(),
            exit_press_window_ms: 400,
            clock_tick: Duration::from_millis(1_000),
            revalidate_interval: Duration::from_millis(5_000),
            day_boundary: DayBoundary::Local,
            state_dir: default_state_dir(),
        }
    }
}

/// Default state directory (`~/.focusshell`).
pub fn default_state_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".focusshell"))
        .unwrap_or_else(|| PathBuf::from(".focusshell"))
}

/// Parse a YAML config string.
pub fn parse_config_str(yaml: &str) -> Result<ShellConfig> {
    let raw: RawConfig = if yaml.trim().is_empty() {
        RawConfig::default()
    } else {
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in config file")?
    };
    convert(raw)
}

/// Parse a YAML config file.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<ShellConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve the configuration: explicit path, else `.focusshell.yaml` found by
/// walking up from `start`, else defaults.
pub fn load_config(explicit: Option<&Path>, start: &Path) -> Result<ShellConfig> {
    if let Some(path) = explicit {
        return parse_config_file(path);
    }
    match find_config_walking_up(start) {
        Some(path) => {
            tracing::debug!("Using config file {}", path.display());
            parse_config_file(path)
        }
        None => Ok(ShellConfig::default()),
    }
}

/// Find `.focusshell.yaml` walking up the directory tree.
pub fn find_config_walking_up(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

fn convert(raw: RawConfig) -> Result<ShellConfig> {
    let defaults = ShellConfig::default();

    let home_url = validate_url("home_url", raw.home_url.unwrap_or(defaults.home_url))?;
    let search_base = validate_url(
        "search_base",
        raw.search_base.unwrap_or(defaults.search_base),
    )?;
    let policy_endpoint = validate_url(
        "policy_endpoint",
        raw.policy_endpoint.unwrap_or(defaults.policy_endpoint),
    )?;

    let fetch_timeout = match raw.fetch_timeout_secs {
        Some(0) => bail!("'fetch_timeout_secs' must be greater than zero"),
        Some(secs) => Duration::from_secs(secs),
        None => defaults.fetch_timeout,
    };

    let raw_override = raw.override_.unwrap_or_default();
    let duration_minutes = raw_override.duration_minutes.unwrap_or(30);
    if duration_minutes <= 0 {
        bail!("'override.duration_minutes' must be greater than zero");
    }
    if duration_minutes > MAX_OVERRIDE_MINUTES {
        bail!(
            "'override.duration_minutes' must be at most {} (one day), got {}",
            MAX_OVERRIDE_MINUTES,
            duration_minutes
        );
    }
    let Some(duration) = chrono::Duration::try_minutes(duration_minutes) else {
        bail!("'override.duration_minutes' is out of range: {}", duration_minutes);
    };
    let lock_tap_window_ms = raw_override
        .lock_tap_window_ms
        .unwrap_or(defaults.override_settings.lock_tap_window_ms);
    if lock_tap_window_ms <= 0 {
        bail!("'override.lock_tap_window_ms' must be greater than zero");
    }

    let exit_press_window_ms = raw
        .exit_press_window_ms
        .unwrap_or(defaults.exit_press_window_ms);
    if exit_press_window_ms <= 0 {
        bail!("'exit_press_window_ms' must be greater than zero");
    }

    let clock_tick = positive_millis("clock_tick_ms", raw.clock_tick_ms, defaults.clock_tick)?;
    let revalidate_interval = positive_millis(
        "revalidate_interval_ms",
        raw.revalidate_interval_ms,
        defaults.revalidate_interval,
    )?;

    Ok(ShellConfig {
        home_url,
        search_base,
        policy_endpoint,
        fetch_timeout,
        override_settings: OverrideSettings {
            enabled: raw_override.enabled.unwrap_or(true),
            duration,
            lock_tap_window_ms,
        },
        exit_press_window_ms,
        clock_tick,
        revalidate_interval,
        day_boundary: raw.day_boundary.unwrap_or_default(),
        state_dir: raw.state_dir.unwrap_or(defaults.state_dir),
    })
}

fn validate_url(field: &str, value: String) -> Result<String> {
    let parsed =
        Url::parse(&value).with_context(|| format!("'{}' is not a valid URL: {}", field, value))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("'{}' must be an http(s) URL, got: {}", field, value);
    }
    Ok(value)
}

fn positive_millis(field: &str, value: Option<u64>, default: Duration) -> Result<Duration> {
    match value {
        Some(0) => bail!("'{}' must be greater than zero", field),
        Some(ms) => Ok(Duration::from_millis(ms)),
        None => Ok(default),
    }
}
