//! `focusshell run`: drive the shell over JSON lines on stdin/stdout.
//!
//! The host process (the one embedding the web view) writes `ShellEvent`s to
//! our stdin and executes the `ShellCommand`s we print. Diagnostics go to
//! stderr so stdout stays pure JSON lines.

use crate::config::ShellConfig;
use crate::override_window::SystemClock;
use crate::policy::HttpPolicySource;
use crate::shell::protocol::{decode_event, encode_command, encode_error};
use crate::shell::{CommandSink, ShellCommand, ShellEvent, ShellRuntime};
use crate::storage::FileStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Inbound events buffered ahead of the controller.
const EVENT_BUFFER: usize = 64;

/// Encodes commands onto the stdout line queue.
struct LineSink {
    lines: mpsc::UnboundedSender<String>,
}

impl CommandSink for LineSink {
    fn deliver(&mut self, command: ShellCommand) {
        match encode_command(&command) {
            Ok(line) => {
                let _ = self.lines.send(line);
            }
            Err(e) => tracing::error!("Failed to encode command: {}", e),
        }
    }
}

pub async fn run_bridge(config: ShellConfig) -> Result<()> {
    let store = Arc::new(FileStore::new(&config.state_dir));
    let source = Arc::new(
        HttpPolicySource::new(&config.policy_endpoint, config.fetch_timeout)
            .context("Failed to build HTTP client")?,
    );
    let clock = Arc::new(SystemClock::new(config.day_boundary));

    tracing::info!(
        "Shell bridge starting (state: {})",
        store.path().display()
    );

    let runtime = ShellRuntime::new(config, store, source, clock);
    let shutdown = runtime.shutdown_token();
    spawn_ctrl_c(shutdown.clone());

    let (line_tx, line_rx) = mpsc::unbounded_channel::<String>();
    let (event_tx, event_rx) = mpsc::channel::<ShellEvent>(EVENT_BUFFER);

    let writer = tokio::spawn(write_lines(line_rx));
    let reader = tokio::spawn(read_events(event_tx, line_tx.clone(), shutdown));

    runtime.run(event_rx, LineSink { lines: line_tx }).await;

    reader.abort();
    writer
        .await
        .context("stdout writer panicked")?
        .context("Failed to write to stdout")?;
    Ok(())
}

/// Decode stdin lines into events until EOF. Bad lines are answered with an
/// error line and skipped.
async fn read_events(
    events: mpsc::Sender<ShellEvent>,
    lines: mpsc::UnboundedSender<String>,
    shutdown: CancellationToken,
) {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::new();

    loop {
        line.clear();
        let read = tokio::select! {
            _ = shutdown.cancelled() => break,
            read = reader.read_line(&mut line) => read,
        };
        match read {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Failed to read stdin: {}", e);
                break;
            }
        }

        match decode_event(&line) {
            Ok(Some(event)) => {
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("{}", error.message);
                if let Ok(reply) = encode_error(&error) {
                    let _ = lines.send(reply);
                }
            }
        }
    }
    tracing::debug!("stdin closed");
}

async fn write_lines(mut lines: mpsc::UnboundedReceiver<String>) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.recv().await {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}

fn spawn_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl+C, shutting down");
            shutdown.cancel();
        }
    });
}
