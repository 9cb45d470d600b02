//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// Respects `RUST_LOG`; otherwise logs warnings, or everything from the cart
/// crates at debug level when `verbose` is set. Logs go to stderr so they
/// never mix with `--json` output.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "warn,cart_core=debug,cart_storage=debug,cart_data=debug,cart_store=debug,cart=debug"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(verbose)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
}
