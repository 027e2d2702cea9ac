//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry.rs, dispatcher.rs, bridge (debug mode)
//!     → tracing events with structured fields (route, count, segment)
//!     → logging.rs subscriber (stderr)
//! ```
//!
//! # Design Decisions
//! - Diagnostic notices are gated by the dispatcher's debug flag, then
//!   filtered again by the subscriber
//! - Callback failures are always logged, debug or not

pub mod logging;
