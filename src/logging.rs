//! Log output setup
//!
//! Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "skycast=debug"
    } else {
        "skycast=info"
    }
}

/// Installs the global tracing subscriber
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    if result.is_ok() {
        tracing::debug!("logging initialized");
    }
}
