//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (script load):
//!     route + Callback
//!     → path.rs (normalize route into a route key)
//!     → registry.rs (dedup by identity, append in order)
//!
//! Dispatch (every lifecycle signal):
//!     full path
//!     → dispatcher.rs (route change check, view state reset)
//!     → path.rs (probe sequence: "", "a", "a/b", ...)
//!     → registry.rs (callbacks per probe key)
//!     → handler.rs (invoke with HandlerContext)
//! ```
//!
//! # Design Decisions
//! - Prefix probing against a flat map, no explicit tree
//! - Deterministic: global key first, then shortest to longest prefix
//! - Registration order is execution order within a route key

pub mod dispatcher;
pub mod handler;
pub mod path;
pub mod registry;

pub use dispatcher::{DispatchError, DispatchReport, Dispatcher, FailurePolicy, HandlerFailure};
pub use handler::{Callback, DedupStrategy, HandlerContext, HandlerError, HandlerResult, IdentityFn};
pub use registry::Registry;
