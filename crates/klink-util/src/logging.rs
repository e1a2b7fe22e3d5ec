//! Logging initialization for hosts embedding klink.

/// Initialize the global `tracing` subscriber.
///
/// Reads `RUST_LOG` for filtering and defaults to `warn`. Safe to call
/// repeatedly; only the first call installs a subscriber.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}
