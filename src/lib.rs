//! Page initialization dispatcher.
//!
//! Maps the current page path to callbacks registered per route prefix, so
//! setup code runs on every page view of a partial-navigation web
//! application, including views reached without a full document load.

pub mod bridge;
pub mod config;
pub mod observability;
pub mod routing;
pub mod view;

pub use bridge::{EventBridge, LifecycleEvent, Signal};
pub use config::DispatchConfig;
pub use routing::{Callback, DispatchError, DispatchReport, Dispatcher, HandlerContext};
pub use view::ViewState;
