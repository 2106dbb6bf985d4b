use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup logging.
/// By default, it will only show logs from our crate at the info level, on stderr.
///
/// The log level can be overridden by setting the `ATLAS_LOG` environment variable.
/// If the `ATLAS_LOG_ALL` environment variable is set, logs from all crates are shown at that level.
/// Passing `debug = true` (the `--debug` flag) forces the debug level.
pub fn setup_logging(debug: bool) {
    let filter = build_filter(
        debug,
        std::env::var("ATLAS_LOG").ok(),
        std::env::var("ATLAS_LOG_ALL").is_ok(),
    );

    // Logs go to stderr so they never mix with command output.
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(filter))
        .init();
}

/// Build the filter directive.
/// This will either be "log_level" or "atlascli=log_level".
fn build_filter(debug: bool, log_level: Option<String>, show_all_logs: bool) -> String {
    let log_level = if debug {
        "debug".to_string()
    } else {
        log_level.unwrap_or_else(|| "info".to_string())
    };

    if show_all_logs {
        log_level
    } else {
        format!("atlascli={log_level}")
    }
}
