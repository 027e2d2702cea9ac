//! Lifecycle event bridge.
//!
//! # Data Flow
//! ```text
//! Host signal (document ready, content settled, history navigation)
//!     → EventHost listener (one per signal, installed once)
//!     → EventBridge::handle
//!     → Location::pathname
//!     → Dispatcher::run(path, LifecycleEvent)
//! ```
//!
//! # Design Decisions
//! - All signals funnel through one handler; the dispatcher never sees
//!   which signal fired except through the event value
//! - The host is a trait so the bridge runs outside a browser too
//! - A signal raised while a dispatch is running is queued and gets its own
//!   cycle once the running one returns, in the order it was raised

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::BridgeConfig;
use crate::routing::{DispatchError, DispatchReport, Dispatcher, HandlerFailure};

#[cfg(target_arch = "wasm32")]
pub mod browser;

/// Host lifecycle signals the bridge listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    /// Initial document load.
    DocumentReady,
    /// Page fragment content swapped in and settled.
    ContentSettled,
    /// History back/forward navigation.
    HistoryNavigation,
}

impl Signal {
    pub const ALL: [Signal; 3] = [
        Signal::DocumentReady,
        Signal::ContentSettled,
        Signal::HistoryNavigation,
    ];
}

/// The event value passed to callbacks dispatched by the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub signal: Signal,
    /// Page path at the time the signal fired.
    pub path: String,
}

/// Errors raised while installing listeners.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("host environment unavailable: {0}")]
    Unavailable(&'static str),

    #[error("failed to listen for {event:?}: {reason}")]
    Listener { event: String, reason: String },
}

/// Source of the current page path.
pub trait Location {
    /// The current document path, if known.
    fn pathname(&self) -> Option<String>;
}

/// A listener installed on a host.
pub type Listener = Box<dyn Fn()>;

/// Something that can deliver lifecycle signals.
pub trait EventHost {
    /// Attach `listener` to the host event named `event_name`.
    fn listen(&mut self, signal: Signal, event_name: &str, listener: Listener)
        -> Result<(), BridgeError>;
}

/// A location whose path is set by hand.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocation {
    path: Rc<RefCell<Option<String>>>,
}

impl MemoryLocation {
    pub fn new(path: impl Into<String>) -> Self {
        let location = Self::default();
        location.set(path);
        location
    }

    /// Move to a new path. Clones share the same path.
    pub fn set(&self, path: impl Into<String>) {
        *self.path.borrow_mut() = Some(path.into());
    }

    pub fn clear(&self) {
        *self.path.borrow_mut() = None;
    }
}

impl Location for MemoryLocation {
    fn pathname(&self) -> Option<String> {
        self.path.borrow().clone()
    }
}

/// An event host driven by hand, keyed by event name.
#[derive(Default)]
pub struct ManualHost {
    listeners: HashMap<String, Vec<(Signal, Listener)>>,
}

impl ManualHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire a host event by name. Returns the number of listeners run.
    pub fn fire(&self, event_name: &str) -> usize {
        let Some(listeners) = self.listeners.get(event_name) else {
            return 0;
        };
        for (_, listener) in listeners {
            listener();
        }
        listeners.len()
    }

    /// Number of listeners attached for a signal.
    pub fn listener_count(&self, signal: Signal) -> usize {
        self.listeners
            .values()
            .flatten()
            .filter(|(s, _)| *s == signal)
            .count()
    }
}

impl EventHost for ManualHost {
    fn listen(
        &mut self,
        signal: Signal,
        event_name: &str,
        listener: Listener,
    ) -> Result<(), BridgeError> {
        self.listeners
            .entry(event_name.to_string())
            .or_default()
            .push((signal, listener));
        Ok(())
    }
}

/// Feeds lifecycle signals into a shared dispatcher.
pub struct EventBridge<L> {
    dispatcher: Rc<RefCell<Dispatcher<LifecycleEvent>>>,
    location: L,
    config: BridgeConfig,
    subscribed: Cell<bool>,
    pending: RefCell<VecDeque<LifecycleEvent>>,
}

impl<L: Location + 'static> EventBridge<L> {
    pub fn new(
        dispatcher: Rc<RefCell<Dispatcher<LifecycleEvent>>>,
        location: L,
        config: BridgeConfig,
    ) -> Rc<Self> {
        Rc::new(Self {
            dispatcher,
            location,
            config,
            subscribed: Cell::new(false),
            pending: RefCell::default(),
        })
    }

    /// Attach one listener per signal to the host.
    ///
    /// Only the first call subscribes; later calls return `Ok(false)`.
    pub fn subscribe<H: EventHost>(bridge: &Rc<Self>, host: &mut H) -> Result<bool, BridgeError> {
        if bridge.subscribed.replace(true) {
            tracing::debug!("Event bridge already subscribed");
            return Ok(false);
        }

        for signal in Signal::ALL {
            let event_name = bridge.config.event_name(signal);
            let handler = Rc::clone(bridge);
            host.listen(signal, event_name, Box::new(move || handler.on_signal(signal)))?;
            tracing::debug!(signal = ?signal, event = %event_name, "Listening for lifecycle event");
        }
        Ok(true)
    }
}

impl<L: Location> EventBridge<L> {
    /// Dispatch the current location path for a signal.
    ///
    /// Returns `Ok(None)` when the dispatcher is already running a cycle. The
    /// signal is then queued with the path it saw and dispatched after the
    /// running cycle returns.
    pub fn handle(&self, signal: Signal) -> Result<Option<DispatchReport>, DispatchError> {
        let event = LifecycleEvent {
            signal,
            path: self.location.pathname().unwrap_or_default(),
        };

        let result = {
            let Ok(mut dispatcher) = self.dispatcher.try_borrow_mut() else {
                tracing::debug!(
                    signal = ?signal,
                    path = %event.path,
                    "Signal raised during a dispatch cycle, queued"
                );
                self.pending.borrow_mut().push_back(event);
                return Ok(None);
            };
            dispatcher.run(event.path.as_str(), &event)
        };

        self.drain_pending();
        result.map(Some)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed.get()
    }

    /// Number of queued signals waiting for a cycle.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    fn drain_pending(&self) {
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };

            let result = match self.dispatcher.try_borrow_mut() {
                Ok(mut dispatcher) => dispatcher.run(event.path.as_str(), &event),
                Err(_) => {
                    // Borrowed outside the bridge; the next handle drains it.
                    self.pending.borrow_mut().push_front(event);
                    break;
                }
            };
            self.report(event.signal, result);
        }
    }

    fn on_signal(&self, signal: Signal) {
        match self.handle(signal) {
            Ok(Some(report)) => self.report(signal, Ok(report)),
            Ok(None) => {}
            Err(e) => self.report(signal, Err(e)),
        }
    }

    fn report(&self, signal: Signal, result: Result<DispatchReport, DispatchError>) {
        match result {
            Ok(report) => report.failures.iter().for_each(log_failure),
            Err(e) => tracing::error!(signal = ?signal, "Dispatch aborted: {}", e),
        }
    }
}

fn log_failure(failure: &HandlerFailure) {
    tracing::error!(
        route = %failure.route,
        index = failure.index,
        error = %failure.error,
        "Route callback failed"
    );
}
