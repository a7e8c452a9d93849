use std::fs::OpenOptions;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::constants::{ENV_LOG_FILE, ENV_LOG_FILTER};

/// Install file logging when `GROUPCHAT_LOG_FILE` is set.
///
/// The terminal belongs to the UI, so there is no stdout layer. Returns the
/// log path when a subscriber was installed.
pub fn init_tracing() -> Option<String> {
    let log_path = std::env::var(ENV_LOG_FILE).ok()?;

    let file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", log_path, e);
            return None;
        }
    };

    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_filter(filter);

    if tracing_subscriber::registry().with(file_layer).try_init().is_err() {
        return None;
    }
    Some(log_path)
}
