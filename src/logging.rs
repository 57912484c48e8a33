use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "COMPLINE_LOG";

/// Initialize tracing with optional file output.
///
/// Logging is disabled by default: stdout carries the completion payload
/// and stderr ends up in the user's shell. Set `COMPLINE_LOG` to a file path
/// to enable it. The file is appended to, so every completion request of a
/// session lands in the same log.
pub fn init_tracing() {
    let Some(log_path) = std::env::var_os(LOG_ENV).filter(|p| !p.is_empty()) else {
        return;
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => file,
        Err(_) => return,
    };

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    // A subscriber may already be set (e.g., by a host application).
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init();
}
