//! Logging setup: console always, rolling file on request.

use autoclick_core::get_log_dir;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Set to `1` to also write logs to `<data dir>/autoclick/logs/`.
pub const LOG_FILE_ENV: &str = "AUTOCLICK_LOG_FILE";

const DEFAULT_FILTER: &str = "autoclick=info,autoclick_core=info,autoclick_platform=info";

pub fn file_logging_requested() -> bool {
    std::env::var(LOG_FILE_ENV).is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize logging. `RUST_LOG` overrides the default filter.
pub fn setup(with_file: bool) {
    let console_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let file_layer = if with_file {
        let log_dir = get_log_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
            None
        } else {
            let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "autoclick.log");
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(file_appender)
                    .with_filter(filter()),
            )
        }
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(console_layer);
    let result = match file_layer {
        Some(file_layer) => registry.with(file_layer).try_init(),
        None => registry.try_init(),
    };
    if let Err(e) = result {
        eprintln!("Warning: logging already initialized: {}", e);
        return;
    }

    if with_file {
        tracing::info!("File logging enabled: {:?}", get_log_dir());
    }
}
