//! Logging initialization.
//!
//! Log output goes to stderr; stdout is reserved for reduction records.
//! The RUST_LOG environment variable overrides the configured level.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem at `level`, as pretty or JSON lines.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section.
///
/// `--verbose` raises the level to debug; `--json-logs` forces JSON output.
pub fn init_from_config(config: &dprt_core::Config, verbose: bool, json_logs: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.to_lowercase()
    };
    let json_format = json_logs || config.logging.format == "json";
    init(&level, json_format);
}
