//! Browser event host.
//!
//! # Responsibilities
//! - Attach lifecycle listeners to `window` / `document`
//! - Read the current path from `window.location`
//! - Install the scroll reset hook when configured
//!
//! # Design Decisions
//! - History navigation is a window event; the others are document events
//! - Listener closures live for the page session (`Closure::forget`)
//! - If the document finished loading before `install`, the initial
//!   dispatch runs immediately

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, EventTarget, Window};

use crate::bridge::{BridgeError, EventBridge, EventHost, Listener, LifecycleEvent, Location, Signal};
use crate::config::DispatchConfig;
use crate::routing::Dispatcher;

/// Reads `window.location.pathname`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowLocation;

impl Location for WindowLocation {
    fn pathname(&self) -> Option<String> {
        web_sys::window()?.location().pathname().ok()
    }
}

/// Delivers lifecycle signals from the browser.
pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new() -> Result<Self, BridgeError> {
        let window = web_sys::window().ok_or(BridgeError::Unavailable("window"))?;
        let document = window
            .document()
            .ok_or(BridgeError::Unavailable("document"))?;
        Ok(Self { window, document })
    }

    /// Returns true once the document has been parsed.
    pub fn document_loaded(&self) -> bool {
        self.document.ready_state() != "loading"
    }
}

impl EventHost for BrowserHost {
    fn listen(
        &mut self,
        signal: Signal,
        event_name: &str,
        listener: Listener,
    ) -> Result<(), BridgeError> {
        let target: &EventTarget = match signal {
            Signal::HistoryNavigation => self.window.as_ref(),
            Signal::DocumentReady | Signal::ContentSettled => self.document.as_ref(),
        };

        let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
            listener();
        }));
        target
            .add_event_listener_with_callback(event_name, callback.as_ref().unchecked_ref())
            .map_err(|e| BridgeError::Listener {
                event: event_name.to_string(),
                reason: format!("{:?}", e),
            })?;
        callback.forget();
        Ok(())
    }
}

/// Build a dispatcher for this page and wire it to the browser.
///
/// `register` adds the page's callbacks before any signal is delivered.
/// Callbacks registered later through the returned handle run from the
/// next lifecycle signal on.
pub fn install<F>(
    config: &DispatchConfig,
    register: F,
) -> Result<Rc<RefCell<Dispatcher<LifecycleEvent>>>, BridgeError>
where
    F: FnOnce(&mut Dispatcher<LifecycleEvent>),
{
    let mut host = BrowserHost::new()?;

    let mut dispatcher = Dispatcher::from_config(config);
    register(&mut dispatcher);
    if config.bridge.scroll_reset {
        dispatcher.on_route_change(|_from, _to| {
            if let Some(window) = web_sys::window() {
                window.scroll_to_with_x_and_y(0.0, 0.0);
            }
        });
    }
    let dispatcher = Rc::new(RefCell::new(dispatcher));

    let bridge = EventBridge::new(Rc::clone(&dispatcher), WindowLocation, config.bridge.clone());
    EventBridge::subscribe(&bridge, &mut host)?;

    if host.document_loaded() {
        tracing::debug!("Document already loaded, dispatching initial view");
        if let Err(e) = bridge.handle(Signal::DocumentReady) {
            tracing::error!("Initial dispatch aborted: {}", e);
        }
    }

    Ok(dispatcher)
}
