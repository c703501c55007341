//! Logging init: file under the XDG state dir, or stderr when that fails.

use anyhow::Result;
use std::fs::{self, File};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,event_post=debug,event_post_core=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Plain-text subscriber writing every event to `file` through one shared handle.
fn file_subscriber(file: File) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish()
}

/// Log to `~/.local/state/event-post/event-post.log`.
///
/// Returns Err when the log file cannot be opened so the caller can fall
/// back to `init_logging_stderr`.
pub fn init_logging() -> Result<()> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("event-post")?;
    let log_path = xdg_dirs.place_state_file("event-post.log")?;

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing::subscriber::set_global_default(file_subscriber(file))?;

    tracing::info!("logging to {}", log_path.display());
    Ok(())
}

pub fn init_logging_stderr() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}
