//! `focusshell override` and `focusshell lock`.

use crate::cli::local::LocalState;
use crate::config::ShellConfig;
use crate::override_window::OverrideOffer;
use anyhow::{bail, Result};
use colored::Colorize;

/// Grant today's override, if still available.
pub async fn run_override(config: &ShellConfig) -> Result<()> {
    let mut local = LocalState::load(config).await;
    let now = local.now;

    let Some((_, writes)) = local.window.grant(&now) else {
        match local.window.offer(&now) {
            OverrideOffer::Disabled => bail!("Overrides are disabled in the configuration"),
            _ => bail!("Today's override has already been used"),
        }
    };
    local.persist(writes).await;

    println!();
    println!(
        "  {} Override active for {}",
        "✓".yellow().bold(),
        local.window.timer_text(&now).unwrap_or_default().bold()
    );
    println!("  {}", "Double-tap the timer (or `focusshell lock`) to end it early.".dimmed());
    println!();
    Ok(())
}

/// End any override and lock overrides for the rest of today.
pub async fn run_lock(config: &ShellConfig) -> Result<()> {
    let mut local = LocalState::load(config).await;
    let now = local.now;
    let writes = local.window.clear(true, &now);
    local.persist(writes).await;

    println!();
    println!(
        "  {} Overrides locked until tomorrow",
        "✓".green().bold()
    );
    println!();
    Ok(())
}
