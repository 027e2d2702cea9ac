//! View state subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher.rs (start of every cycle)
//!     → state.rs reset_temp()         scratch data emptied
//!     → state.rs ensure_view(segment)  persistent entry created if absent
//!
//! Callbacks:
//!     → HandlerContext::data()  persistent data for the current view segment
//!     → HandlerContext::temp()  scratch data for this cycle only
//! ```
//!
//! # Design Decisions
//! - Values are `serde_json::Value` so callbacks can store arbitrary state
//! - Persistent entries are never removed by the engine

pub mod state;

pub use state::{ViewData, ViewState};
