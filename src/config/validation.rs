//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every lifecycle signal has a usable, distinct event name
//! - Check route manifests name their handlers
//! - Check the log filter parses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>
//! - Duplicate handlers in a manifest are not errors; registration skips them

use std::collections::HashMap;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::bridge::Signal;
use crate::config::schema::DispatchConfig;

/// A semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("event name for {0:?} is empty")]
    EmptyEventName(Signal),

    #[error("event {event:?} is used by both {first:?} and {second:?}")]
    SharedEventName {
        event: String,
        first: Signal,
        second: Signal,
    },

    #[error("route {route:?} has an empty handler name at position {index}")]
    EmptyHandlerName { route: String, index: usize },

    #[error("invalid log filter {filter:?}: {reason}")]
    InvalidLogFilter { filter: String, reason: String },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen: HashMap<&str, Signal> = HashMap::new();
    for signal in Signal::ALL {
        let name = config.bridge.event_name(signal);
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyEventName(signal));
            continue;
        }
        if let Some(first) = seen.insert(name, signal) {
            errors.push(ValidationError::SharedEventName {
                event: name.to_string(),
                first,
                second: signal,
            });
        }
    }

    for manifest in &config.routes {
        for (index, handler) in manifest.handlers.iter().enumerate() {
            if handler.trim().is_empty() {
                errors.push(ValidationError::EmptyHandlerName {
                    route: manifest.route.clone(),
                    index,
                });
            }
        }
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_filter) {
        errors.push(ValidationError::InvalidLogFilter {
            filter: config.observability.log_filter.clone(),
            reason: e.to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
