//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the log filter from `RUST_LOG`, the debug flag, or config
//!
//! # Design Decisions
//! - `RUST_LOG` always wins over configuration
//! - Debug mode replaces the configured filter with `page_dispatch=debug`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_filter(config: &ObservabilityConfig, debug: bool) -> String {
    if debug {
        "page_dispatch=debug".to_string()
    } else {
        config.log_filter.clone()
    }
}

/// Install the global tracing subscriber.
///
/// Returns false if a subscriber was already installed.
pub fn init_logging(config: &ObservabilityConfig, debug: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(config, debug).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(config.log_targets)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .is_ok()
}
