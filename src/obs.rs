//! Tracing setup shared by the binary and by tests.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for the given debug flag.
///
/// Outside debug mode only warnings and errors from this crate are emitted.
pub fn default_filter(debug_mode: bool) -> &'static str {
    if debug_mode {
        "rust_fines_client=debug"
    } else {
        "rust_fines_client=warn"
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the debug flag.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(debug_mode: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(debug_mode).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_follows_debug_flag() {
        assert_eq!(default_filter(true), "rust_fines_client=debug");
        assert_eq!(default_filter(false), "rust_fines_client=warn");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(false);
        init_tracing(true);
    }
}
