use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "info,switchboard=debug";

/// Install the global fmt subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Safe to call more than once; only the first call installs.
pub fn init_tracing(default_filter: &str) {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(filter = default_filter, "tracing initialized");
    }
}
