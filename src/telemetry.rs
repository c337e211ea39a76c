//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "storefront_api=info,storefront_server=info,tower_http=info";

/// Install the global fmt subscriber. `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // A second call (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
