//! Tracing setup. The terminal belongs to the UI, so logs go to a file.

use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};

use tracing_subscriber::EnvFilter;

use crate::config::config_dir;

pub const LOG_ENV: &str = "TERMVISION_LOG";

pub fn default_log_path() -> PathBuf {
    config_dir().join("termvision.log")
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Failures are reported on stderr and otherwise ignored.
pub fn init_logging(path: Option<PathBuf>) {
    let path = path.unwrap_or_else(default_log_path);
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("failed to open log file {}: {e}", path.display());
            return;
        }
    };
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
    {
        eprintln!("failed to init logger: {e}");
    }
}
