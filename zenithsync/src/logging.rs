//! Logging initialization.
//!
//! Console logging honors `RUST_LOG` when set; callers pass the filter used
//! otherwise. File logging writes daily-rotated plain-text logs through a
//! non-blocking appender whose guard must outlive the program's logging.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Timestamp format for console output.
fn local_timer() -> LocalTime<impl time::formatting::Formattable + Clone> {
    LocalTime::new(time::macros::format_description!(
        "[hour]:[minute]:[second]"
    ))
}

/// Initialize console logging.
///
/// `default_filter` applies when `RUST_LOG` is unset. Repeated calls (as in
/// test binaries) are no-ops.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(local_timer())
        .with_target(false)
        .try_init();
}

/// Initialize logging to a daily-rotated file in `dir`.
///
/// The returned guard flushes buffered log lines when dropped; hold it for
/// the life of the program.
pub fn init_with_file(dir: &Path, default_filter: &str) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(dir, "zenithsync.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    guard
}
