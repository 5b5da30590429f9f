//! # tuyabridged — Tuya bridge daemon
//!
//! Composition root that wires the adapters together and runs the bridge.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Provision the configured devices and spawn their tasks
//! - Read newline-delimited JSON events from stdin and answer on stdout
//! - Flush pending light writes on EOF or Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no translation logic belongs here.

mod config;
mod daemon;
mod events;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;
use tuyabridge_adapter_memory::{InMemoryHub, LoggingTransport};

use crate::config::Config;
use crate::daemon::Daemon;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    let mut daemon = Daemon::build(&config, InMemoryHub::new(), LoggingTransport::new())?;
    tracing::info!(
        devices = daemon.bridge().len(),
        light_debounce_ms = config.runtime.light_debounce_ms,
        "tuyabridged started, reading events from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            tracing::info!("input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = daemon.handle_line(&line).await;
        let mut payload = serde_json::to_vec(&response)?;
        payload.push(b'\n');
        stdout.write_all(&payload).await?;
        stdout.flush().await?;
    }

    daemon.shutdown().await;
    Ok(())
}
