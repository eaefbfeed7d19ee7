//! `focusshell status`: blocklist and override summary.

use crate::cli::local::LocalState;
use crate::config::ShellConfig;
use crate::override_window::OverrideOffer;
use crate::storage::FileStore;
use anyhow::Result;
use colored::Colorize;

pub async fn run_status(config: &ShellConfig) -> Result<()> {
    let local = LocalState::load(config).await;

    println!();
    println!("  {}  {}", "focusshell".bold(), "status".dimmed());
    println!(
        "  {}",
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".dimmed()
    );
    println!();
    println!(
        "  Blocklist: {} hosts ({})",
        local.policy.banned_hosts().len().to_string().bold(),
        local.policy.origin()
    );

    match local.window.timer_text(&local.now) {
        Some(left) => println!(
            "  Override:  {} ({} left)",
            "active".yellow().bold(),
            left
        ),
        None => {
            let offer = match local.window.offer(&local.now) {
                OverrideOffer::Available => "available today".green(),
                OverrideOffer::UsedToday => "used today".red(),
                OverrideOffer::Disabled => "disabled".dimmed(),
            };
            println!("  Override:  inactive, {}", offer);
        }
    }
    if let Some(day) = local.window.last_date() {
        println!("  Last used: {}", day);
    }

    println!("  Home:      {}", config.home_url.cyan());
    println!(
        "  State:     {}",
        FileStore::new(&config.state_dir)
            .path()
            .display()
            .to_string()
            .dimmed()
    );
    println!();
    Ok(())
}
