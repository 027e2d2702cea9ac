//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files and
//! fall back to defaults for missing fields.

use serde::{Deserialize, Serialize};

use crate::bridge::Signal;
use crate::routing::{DedupStrategy, FailurePolicy};

/// Root configuration for a dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Emit diagnostic notices for registration and dispatch steps.
    pub debug: bool,

    /// What a failing callback does to the rest of the cycle.
    pub failure_policy: FailurePolicy,

    /// How duplicate callbacks are detected.
    pub dedup: DedupStrategy,

    /// Lifecycle event wiring.
    pub bridge: BridgeConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Route manifest: named handlers per route.
    pub routes: Vec<RouteManifest>,
}

/// Host event names for each lifecycle signal.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Fired once the initial document is parsed.
    pub document_ready_event: String,

    /// Fired after a page fragment swap has settled.
    pub content_settled_event: String,

    /// Fired on history back/forward navigation.
    pub history_event: String,

    /// Scroll to the top of the page when the route changes.
    pub scroll_reset: bool,
}

impl BridgeConfig {
    /// The host event name a signal is delivered as.
    pub fn event_name(&self, signal: Signal) -> &str {
        match signal {
            Signal::DocumentReady => &self.document_ready_event,
            Signal::ContentSettled => &self.content_settled_event,
            Signal::HistoryNavigation => &self.history_event,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            document_ready_event: "DOMContentLoaded".to_string(),
            content_settled_event: "htmx:afterSettle".to_string(),
            history_event: "popstate".to_string(),
            scroll_reset: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Include event targets in log lines.
    pub log_targets: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "page_dispatch=info".to_string(),
            log_targets: false,
        }
    }
}

/// Named handlers registered under one route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteManifest {
    /// Route the handlers are registered under ("" for every page).
    #[serde(default)]
    pub route: String,

    /// Handler names, in registration order.
    pub handlers: Vec<String>,
}
