//! Tracing bootstrap
//!
//! Events go to stderr so report output written to stdout stays clean.

use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default directive when neither `RUST_LOG` nor the settings provide one
pub const DEFAULT_FILTER: &str = "tally=info";

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` wins over `fallback`; an unparsable fallback falls back to
/// [`DEFAULT_FILTER`]. Only the first call has any effect.
pub fn init_tracing(fallback: &str) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(fallback))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        // A subscriber installed by the host (tests, embedding apps) is kept.
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}
