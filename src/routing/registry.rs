//! Callback registration table.
//!
//! # Responsibilities
//! - Store callbacks per route key, in registration order
//! - Reject duplicate callbacks per route key
//!
//! # Design Decisions
//! - Keys are normalized the same way as dispatch paths
//! - A duplicate is a silent no-op (diagnostic only in debug mode)
//! - No unregistration: entries live for the whole session
//! - Callbacks are never invoked here

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::routing::handler::{Callback, DedupStrategy, IdentityFn};
use crate::routing::path;

/// Callbacks registered under one route key.
struct RouteEntry<E> {
    callbacks: Vec<Callback<E>>,
    /// Identities of `callbacks`, for dedup.
    seen: HashSet<String>,
}

impl<E> Default for RouteEntry<E> {
    fn default() -> Self {
        Self {
            callbacks: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

/// Route key -> ordered callbacks.
pub struct Registry<E> {
    routes: HashMap<String, RouteEntry<E>>,
    identity: IdentityFn<E>,
    debug: bool,
}

impl<E: 'static> Registry<E> {
    /// Create an empty registry deduplicating by source text.
    pub fn new() -> Self {
        Self::with_strategy(DedupStrategy::default())
    }

    /// Create an empty registry using a built-in dedup strategy.
    pub fn with_strategy(strategy: DedupStrategy) -> Self {
        Self::with_identity(strategy.identity())
    }
}

impl<E: 'static> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Registry<E> {
    /// Create an empty registry with a custom identity function.
    pub fn with_identity(identity: IdentityFn<E>) -> Self {
        Self {
            routes: HashMap::new(),
            identity,
            debug: false,
        }
    }

    /// Enable or disable diagnostic notices.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Register a callback under a route.
    ///
    /// Returns the number of distinct callbacks now registered for the route.
    /// Registering a callback whose identity is already present is a no-op.
    pub fn register(&mut self, route: &str, callback: Callback<E>) -> usize {
        let key = path::route_key(route);
        let identity = (self.identity)(&callback);
        let entry = self.routes.entry(key).or_default();

        if entry.seen.contains(&identity) {
            if self.debug {
                tracing::warn!(
                    route = %route,
                    source = %callback.source(),
                    count = entry.callbacks.len(),
                    "Callback already registered for route, skipping"
                );
            }
            return entry.callbacks.len();
        }

        entry.seen.insert(identity);
        entry.callbacks.push(callback);

        if self.debug {
            tracing::debug!(
                route = %route,
                count = entry.callbacks.len(),
                "Callback registered"
            );
        }
        entry.callbacks.len()
    }

    /// Callbacks registered under a route key, in registration order.
    pub fn handlers(&self, key: &str) -> Option<&[Callback<E>]> {
        self.routes.get(key).map(|e| e.callbacks.as_slice())
    }

    /// Number of callbacks registered for a route (normalized first).
    pub fn count(&self, route: &str) -> usize {
        self.routes
            .get(&path::route_key(route))
            .map(|e| e.callbacks.len())
            .unwrap_or(0)
    }

    /// Returns true if the route key has an entry.
    pub fn contains(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }

    /// All route keys with an entry, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Number of route keys.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<E> fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, entry) in &self.routes {
            map.entry(key, &entry.callbacks);
        }
        map.finish()
    }
}
