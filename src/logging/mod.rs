//! Tracing subscriber initialization.

use tracing_subscriber::EnvFilter;

/// Initialize logging for an application embedding this crate.
///
/// The filter comes from `RUST_LOG` when set, otherwise from the given
/// default directive (or `warn`). Safe to call once per process; later
/// calls are no-ops.
pub fn init_logging(default_directive: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive.unwrap_or("warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Initialize logging for tests, routing output through the test writer.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("info"))
        .with_test_writer()
        .try_init();
}
