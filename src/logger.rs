pub use tracing::{debug, error, info, warn, trace, instrument};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "scanpipe_rs=info";

/// Installs the global subscriber. Per-row pipeline events are logged at `trace`, node
/// construction at `debug`, and span timings are printed when debug output is enabled.
pub fn init() {
    init_with_default(DEFAULT_FILTER);
}

pub fn init_with_default(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let is_verbose = {
        let filter = env_filter.to_string();
        filter.contains("debug") || filter.contains("trace")
    };

    let fmt_layer = fmt::layer()
        .with_target(is_verbose)
        .with_timer(fmt::time::uptime())
        .with_span_events(if is_verbose {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        });

    // a second initialization keeps the subscriber that is already installed
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
