//! Tracing setup for the ledger binaries.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor the config provides one.
pub const DEFAULT_FILTER: &str = "info,bazaar=debug,sqlx=warn";

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` wins over `configured`; an unparsable directive falls back to
/// [`DEFAULT_FILTER`].
pub fn init_tracing(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
