//! Diagnostic logging to stderr.

use tracing_subscriber::EnvFilter;

/// Default filter for a `-v` count.
pub fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.  `RUST_LOG` takes precedence over the
/// verbosity derived from `-v`.  Logs never go to stdout, which carries the
/// rendered results.
pub fn init(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed when embedded in tests.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
