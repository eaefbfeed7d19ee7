//! `focusshell check <url>`: would this URL be blocked right now?

use crate::cli::local::LocalState;
use crate::config::ShellConfig;
use crate::guard::{AllowReason, Verdict};
use crate::utils::hosts::canonical_host;
use anyhow::Result;
use colored::Colorize;

pub async fn run_check(config: &ShellConfig, url: &str) -> Result<()> {
    let local = LocalState::load(config).await;
    let outcome = local.evaluate(url);

    println!();
    match &outcome.verdict {
        Verdict::Block { host } => {
            println!("  {} {} is blocked", "✗".red().bold(), url.bold());
            println!("  Matched: {}", host.cyan());
            println!("  Override: {}", local.window.offer(&local.now));
        }
        Verdict::Allow {
            reason: AllowReason::OverrideActive,
        } => {
            println!(
                "  {} {} is allowed (override active)",
                "✓".yellow().bold(),
                url.bold()
            );
        }
        Verdict::Allow {
            reason: AllowReason::NotBanned,
        } => {
            println!("  {} {} is allowed", "✓".green().bold(), url.bold());
            let host = canonical_host(url);
            if host.is_empty() {
                println!("  {}", "No host could be extracted.".dimmed());
            } else {
                println!("  Host: {}", host.dimmed());
            }
        }
    }
    if local.policy.banned_hosts().is_empty() {
        println!(
            "  {}",
            "No cached blocklist yet; run `focusshell refresh`.".dimmed()
        );
    }
    println!();
    Ok(())
}
