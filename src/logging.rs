use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::paths::default_log_path;

const LOG_FILTER_ENV: &str = "STORYREEL_LOG";
const DEFAULT_FILTER: &str = "storyreel=info";

/// Like [`init`], but a broken log destination only costs the logs: the
/// failure is reported on stderr and the app keeps running.
pub fn init_or_warn(log_file: Option<&Path>) -> bool {
    match init(log_file) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            false
        }
    }
}

/// Routes `tracing` output to a file; the terminal belongs to the TUI.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => default_log_path()?,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))
}
