//! Tracing subscriber setup for the binary.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Output goes to stderr so stdout stays
/// free for command results.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = default_filter(config);
    let registry = tracing_subscriber::registry().with(filter);
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let _ = match config.format {
        LogFormat::Json => registry.with(fmt.json()).try_init(),
        LogFormat::Compact => registry.with(fmt.with_target(false).compact()).try_init(),
        LogFormat::Pretty => registry.with(fmt.pretty()).try_init(),
    };
}
