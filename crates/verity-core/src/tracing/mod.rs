//! Tracing setup for binaries and test harnesses.
//!
//! The filter comes from `VERITY_LOG` (standard `EnvFilter` syntax) and falls back
//! to the given default directive. Installing twice is a no-op.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "VERITY_LOG";

static INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber with an `info` default.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Install the global subscriber with a caller-chosen default directive.
pub fn init_tracing_with_default(default_directive: &str) {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(default_directive));
        // Another subscriber may already be installed (e.g. by a test harness).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
