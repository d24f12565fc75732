//! `tracing` subscriber setup for the binary.
//!
//! Log lines always go to stderr so that stdout carries only the report.
//! `RUST_LOG`, when set, replaces the level derived from the flags.
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter directive for the given verbosity flags.
pub fn default_directive(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "ringscan=debug,ringscan_core=debug,info"
    } else {
        "warn"
    }
}

/// Installs the global subscriber. Call once, before any command runs.
pub fn init(quiet: bool, verbose: bool, colors: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(quiet, verbose)));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(colors)
                .with_target(verbose),
        )
        .with(filter)
        .init();
}
