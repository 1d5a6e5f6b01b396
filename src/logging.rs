//! Structured logging setup
//!
//! `RUST_LOG` always wins. Without it the level comes from the command line
//! flags, and logging is off while the full-screen progress view owns the
//! terminal.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// How the binary was asked to report
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogOptions {
    pub verbosity: u8,
    pub quiet: bool,
    pub tui: bool,
}

/// Filter directive used when `RUST_LOG` is unset
pub fn default_directive(options: LogOptions) -> &'static str {
    if options.tui {
        return "off";
    }
    match (options.quiet, options.verbosity) {
        (true, _) => "flight_ingest=warn",
        (false, 0) => "flight_ingest=info",
        (false, 1) => "flight_ingest=debug",
        (false, _) => "flight_ingest=trace,reqwest=debug",
    }
}

/// Install the global subscriber. Returns false, keeping the existing one,
/// when a subscriber is already installed.
pub fn init(options: LogOptions) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(options)));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "subscriber already installed");
            false
        }
    }
}
