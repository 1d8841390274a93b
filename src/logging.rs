//! File-based logging for recite-rs
//!
//! The terminal belongs to the TUI, so tracing output goes to a daily rolling
//! file instead of stdout.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_DIR: &str = ".logs";
const LOG_FILE_PREFIX: &str = "recite-rs";
const DEFAULT_FILTER: &str = "recite_rs=debug,reqwest=info,rodio=info,warn";

/// Initialize the logging system.
///
/// Logs are written to `.logs/recite-rs.YYYY-MM-DD.log`. `RUST_LOG` overrides
/// the default filter.
pub fn init_logging() -> anyhow::Result<()> {
    // Ensure log directory exists
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    // One file per day, never rotated by size
    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, LOG_FILE_PREFIX);
    // Writes happen on a background thread so the render loop never waits on disk
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The writer flushes on drop; keep it for the whole process
    Box::leak(Box::new(guard));

    // RUST_LOG wins over the built-in filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // plain text in the file
        .with_target(true) // module path
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_span_events(FmtSpan::CLOSE); // span timings on close

    // File output only, the terminal is owned by the TUI
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}/", LOG_DIR);

    Ok(())
}

/// Log a content request before it is sent
#[macro_export]
macro_rules! log_fetch_request {
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "Fetch request started");
    };
}

/// Log the outcome of a content request
#[macro_export]
macro_rules! log_fetch_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "Fetch request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "Fetch request failed"),
        }
    };
}
