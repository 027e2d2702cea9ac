//! Route callbacks and their identity.
//!
//! # Responsibilities
//! - Pair each callable with the source text it was written as
//! - Provide the context a callback runs with
//! - Compute callback identity for deduplication
//!
//! # Design Decisions
//! - Default identity is the source text: closures that read the same are
//!   the same callback, whatever state they capture
//! - Reference identity is available for callers that register clones
//! - Callbacks are `Rc`-based; a dispatcher stays on one thread

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::view::{ViewData, ViewState};

/// Error a callback may fail with.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result returned by every callback.
pub type HandlerResult = Result<(), HandlerError>;

type HandlerFn<E> = dyn Fn(&mut HandlerContext<'_, E>) -> HandlerResult;

/// Everything a callback can see while it runs.
pub struct HandlerContext<'a, E> {
    /// The lifecycle event that triggered this cycle.
    pub event: &'a E,
    /// The full path being dispatched.
    pub path: &'a str,
    /// The route key the callback was registered under.
    pub route: &'a str,
    segment: &'a str,
    view: &'a mut ViewState,
}

impl<'a, E> HandlerContext<'a, E> {
    pub(crate) fn new(
        event: &'a E,
        path: &'a str,
        route: &'a str,
        segment: &'a str,
        view: &'a mut ViewState,
    ) -> Self {
        Self {
            event,
            path,
            route,
            segment,
            view,
        }
    }

    /// The top-level segment of the path being dispatched.
    pub fn segment(&self) -> &str {
        self.segment
    }

    /// Persistent data of the current view segment.
    pub fn data(&mut self) -> &mut ViewData {
        self.view.view_mut(self.segment)
    }

    /// Scratch data of the current cycle.
    pub fn temp(&mut self) -> &mut ViewData {
        &mut self.view.temp
    }

    /// The whole view state, for callbacks that reach across views.
    pub fn view(&mut self) -> &mut ViewState {
        self.view
    }
}

/// A registered initialization callback.
///
/// Callbacks must tolerate running many times per session: a route that is
/// dispatched again re-runs every matching callback.
pub struct Callback<E> {
    source: Rc<str>,
    func: Rc<HandlerFn<E>>,
}

impl<E: 'static> Callback<E> {
    /// Create a callback from its source text and callable.
    ///
    /// Use the [`callback!`](crate::callback) macro to capture the source
    /// text of a closure literal automatically.
    pub fn new<F>(source: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut HandlerContext<'_, E>) -> HandlerResult + 'static,
    {
        Self {
            source: Rc::from(source.into()),
            func: Rc::new(func),
        }
    }
}

impl<E> Callback<E> {
    /// The source text this callback was registered with.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Address of the shared callable, stable across clones.
    pub fn address(&self) -> usize {
        Rc::as_ptr(&self.func) as *const () as usize
    }

    pub(crate) fn invoke(&self, cx: &mut HandlerContext<'_, E>) -> HandlerResult {
        (self.func)(cx)
    }
}

impl<E> Clone for Callback<E> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
            func: Rc::clone(&self.func),
        }
    }
}

impl<E> fmt::Debug for Callback<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Build a [`Callback`] whose identity is the literal text of the closure.
///
/// ```ignore
/// dispatcher.register("blog", callback!(|cx| {
///     cx.data().insert("editor".into(), true.into());
///     Ok(())
/// }));
/// ```
#[macro_export]
macro_rules! callback {
    ($handler:expr) => {
        $crate::routing::handler::Callback::new(stringify!($handler), $handler)
    };
}

/// Function computing the dedup identity of a callback.
pub type IdentityFn<E> = Box<dyn Fn(&Callback<E>) -> String>;

/// Built-in dedup strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupStrategy {
    /// Same source text means same callback.
    #[default]
    SourceText,
    /// Same shared callable means same callback.
    Reference,
}

impl DedupStrategy {
    /// The identity function for this strategy.
    pub fn identity<E: 'static>(self) -> IdentityFn<E> {
        match self {
            DedupStrategy::SourceText => Box::new(|cb: &Callback<E>| cb.source().to_string()),
            DedupStrategy::Reference => Box::new(|cb: &Callback<E>| format!("{:#x}", cb.address())),
        }
    }
}
