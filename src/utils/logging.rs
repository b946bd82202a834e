//! Diagnostic logging for the runner.
//!
//! Progress lines meant for the user are printed directly; everything routed
//! through `tracing` goes to stderr so it never mixes with the coverage report.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter for a given number of `-v` flags
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "covrun=info,warn",
        1 => "covrun=debug,info",
        _ => "covrun=trace,debug",
    }
}

/// Initialize stderr logging. `RUST_LOG` takes precedence over `-v`.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    // A subscriber may already be set (e.g. when driven from tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .try_init();
}
