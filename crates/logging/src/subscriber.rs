//! crates/logging/src/subscriber.rs
//! Global subscriber installation.

use super::config::VerbosityConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;

fn build_filter(config: &VerbosityConfig) -> EnvFilter {
    if config.honour_env
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    EnvFilter::new(config.directive())
}

/// Installs the global tracing subscriber, reporting failure when one exists.
///
/// Events are formatted without timestamps at verbose levels below 3 so
/// interactive output stays compact; level 3 adds timestamps and thread ids to
/// help correlate parallel copy workers.
pub fn try_init_tracing(config: &VerbosityConfig) -> Result<(), TryInitError> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = build_filter(config);
    let detailed = config.level >= 3;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(detailed)
        .with_thread_ids(detailed);

    if detailed {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.without_time())
            .try_init()
    }
}

/// Installs the global tracing subscriber, ignoring an existing one.
///
/// # Example
///
/// ```rust,ignore
/// use logging::{VerbosityConfig, init_tracing};
///
/// init_tracing(&VerbosityConfig::from_verbose_level(1));
/// tracing::info!(target: "snaprestore::copy", "file copied");
/// ```
pub fn init_tracing(config: &VerbosityConfig) {
    let _ = try_init_tracing(config);
}
