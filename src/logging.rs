//! Tracing subscriber setup.
//!
//! All engine modules log through the [`tracing`] macros; this module wires
//! up a console subscriber once at startup. `RUST_LOG` overrides the level
//! chosen by the `--verbose` flag.

use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Safe to call more than once; subsequent calls are ignored (relevant for
/// integration tests that share a process).
pub fn init(verbose: bool) {
    let default = if verbose { "dotstash=debug" } else { "dotstash=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
