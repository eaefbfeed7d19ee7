//! `focusshell refresh`: fetch the remote blocklist into the cache.

use crate::config::ShellConfig;
use crate::policy::{HttpPolicySource, PolicyOrigin, PolicyStore};
use crate::storage::FileStore;
use anyhow::{Context, Result};
use colored::Colorize;

pub async fn run_refresh(config: &ShellConfig) -> Result<()> {
    let store = FileStore::new(&config.state_dir);
    let source = HttpPolicySource::new(&config.policy_endpoint, config.fetch_timeout)
        .context("Failed to build HTTP client")?;

    let mut policy = PolicyStore::with_entries(
        PolicyStore::load_cached(&store).await,
        PolicyOrigin::Cache,
    );
    let before = policy.banned_hosts().len();

    let entries = policy
        .refresh_from_remote(&source, &store)
        .await
        .with_context(|| format!("Blocklist refresh failed ({})", source.endpoint()))?;

    println!();
    println!(
        "  {} Blocklist updated: {} entries, {} hosts (was {})",
        "✓".green().bold(),
        entries,
        policy.banned_hosts().len().to_string().bold(),
        before
    );
    println!();
    Ok(())
}
