//! focusshell: a restricted browser shell with a host blocklist and a
//! once-a-day override.
//!
//! Quick start:
//!   focusshell              # show blocklist and override status
//!   focusshell run          # drive the shell over JSON lines (stdin/stdout)
//!   focusshell check <url>  # would this URL be blocked?
//!
//! For more info: focusshell --help

use clap::{Parser, Subcommand};
use colored::Colorize;
use focusshell::cli;
use focusshell::config::{self, ShellConfig};
use std::path::PathBuf;

/// focusshell: one web view with a host blocklist and a daily override.
#[derive(Parser)]
#[command(
    name = "focusshell",
    version,
    about = "Restricted browser shell with a daily override",
    long_about = "focusshell decides, for every navigation, whether the target host is\n\
                  on the blocklist and whether today's override is running.\n\n\
                  Quick start:\n  \
                  focusshell              # show status\n  \
                  focusshell run          # JSON-lines bridge for a web view host\n  \
                  focusshell check <url>  # test a URL against the blocklist"
)]
struct Cli {
    /// Config file (default: .focusshell.yaml, searched upwards)
    #[arg(long, global = true, env = "FOCUSSHELL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding persisted state (overrides the config file)
    #[arg(long, global = true, env = "FOCUSSHELL_STATE_DIR")]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the shell as a JSON-lines bridge on stdin/stdout
    Run,

    /// Check a URL against the cached blocklist and override state
    Check {
        /// URL or host to check
        url: String,
    },

    /// Show blocklist and override status
    Status,

    /// Start today's override
    Override,

    /// End any override and lock overrides until tomorrow
    Lock,

    /// Fetch the remote blocklist into the local cache
    Refresh,
}

#[tokio::main]
async fn main() {
    // Keep stdout clean for the bridge; diagnostics only at RUST_LOG levels.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("focusshell=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let result = match load_config(&cli) {
        Ok(config) => match cli.command {
            Some(Commands::Run) => cli::run::run_bridge(config).await,
            Some(Commands::Check { url }) => cli::check::run_check(&config, &url).await,
            None | Some(Commands::Status) => cli::status::run_status(&config).await,
            Some(Commands::Override) => cli::grant::run_override(&config).await,
            Some(Commands::Lock) => cli::grant::run_lock(&config).await,
            Some(Commands::Refresh) => cli::refresh::run_refresh(&config).await,
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!("  {} {}", "✗".red().bold(), e);
        for cause in e.chain().skip(1) {
            eprintln!("  {} {}", "caused by:".dimmed(), cause);
        }
        eprintln!();
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<ShellConfig> {
    let cwd = std::env::current_dir()?;
    let mut config = config::load_config(cli.config.as_deref(), &cwd)?;
    if let Some(dir) = &cli.state_dir {
        config.state_dir = dir.clone();
    }
    Ok(config)
}
