//! Diagnostic logging setup for the binaries.
//!
//! Logs go to stderr so they never interleave with a report on stdout.
//! `RUST_LOG` takes precedence; otherwise only warnings are shown, or
//! everything down to per-step debug output with `--verbose`.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("saxprobe=debug")
        } else {
            EnvFilter::new("saxprobe=warn")
        }
    });

    // A subscriber may already be installed (tests, embedding callers).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
