//! Tracing subscriber setup shared by all binaries.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `config.level`. `config.format` selects
/// plain text or one JSON object per line.
pub fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.format.eq_ignore_ascii_case("json") {
        builder.json().with_current_span(false).init();
    } else {
        builder.init();
    }
}
