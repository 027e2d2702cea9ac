//! Route dispatch.
//!
//! # Responsibilities
//! - Track the current route and fire route-change hooks
//! - Reset scratch data and create persistent view data
//! - Walk the probe sequence and invoke matching callbacks
//!
//! # Design Decisions
//! - Re-dispatching the same path re-runs every matching callback
//! - Probe order first, registration order second
//! - Fail-fast by default; `FailurePolicy::Collect` keeps the cycle going
//! - `run` takes `&mut self`: a callback cannot re-enter its own dispatcher
//! - Callback failures are returned, not logged; the caller decides

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::LifecycleEvent;
use crate::config::DispatchConfig;
use crate::routing::handler::{Callback, DedupStrategy, HandlerContext, HandlerError, IdentityFn};
use crate::routing::path;
use crate::routing::registry::Registry;
use crate::view::ViewState;

/// What happens when a callback fails during a dispatch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the cycle at the first failing callback.
    #[default]
    FailFast,
    /// Run every callback and report failures afterwards.
    Collect,
}

/// Errors returned by a dispatch cycle.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A callback failed and the cycle was aborted.
    #[error("callback #{index} for route {route:?} failed: {source}")]
    Handler {
        route: String,
        index: usize,
        source: HandlerError,
    },
}

/// A callback failure recorded under `FailurePolicy::Collect`.
#[derive(Debug)]
pub struct HandlerFailure {
    /// Route key the callback was registered under.
    pub route: String,
    /// Position of the callback within that route.
    pub index: usize,
    /// Source text of the callback.
    pub source_text: String,
    pub error: HandlerError,
}

/// Outcome of one dispatch cycle.
#[derive(Debug)]
pub struct DispatchReport {
    /// The dispatched path, as given.
    pub path: String,
    /// False when the path equals the previously dispatched one.
    pub route_changed: bool,
    /// Every route key checked, in order.
    pub probes: Vec<String>,
    /// Route keys that had callbacks, in order.
    pub matched: Vec<String>,
    /// Number of callbacks invoked.
    pub invoked: usize,
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    /// Returns true if every invoked callback succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

type RouteChangeHook = Box<dyn FnMut(Option<&str>, &str)>;

/// Maps paths to registered callbacks and runs them.
pub struct Dispatcher<E = LifecycleEvent> {
    registry: Registry<E>,
    view: ViewState,
    current_route: Option<String>,
    policy: FailurePolicy,
    debug: bool,
    route_change_hooks: Vec<RouteChangeHook>,
}

impl<E: 'static> Dispatcher<E> {
    /// Create a dispatcher with default settings.
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Create a dispatcher from configuration.
    pub fn from_config(config: &DispatchConfig) -> Self {
        let mut dispatcher = Self::with_registry(Registry::with_strategy(config.dedup));
        dispatcher.set_policy(config.failure_policy);
        dispatcher.set_debug(config.debug);
        dispatcher
    }

    /// Create a dispatcher using a custom callback identity function.
    pub fn with_identity(identity: IdentityFn<E>) -> Self {
        Self::with_registry(Registry::with_identity(identity))
    }

    /// Create a dispatcher using a built-in dedup strategy.
    pub fn with_strategy(strategy: DedupStrategy) -> Self {
        Self::with_registry(Registry::with_strategy(strategy))
    }
}

impl<E: 'static> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Dispatcher<E> {
    fn with_registry(registry: Registry<E>) -> Self {
        Self {
            registry,
            view: ViewState::new(),
            current_route: None,
            policy: FailurePolicy::default(),
            debug: false,
            route_change_hooks: Vec::new(),
        }
    }

    /// Enable or disable diagnostic notices.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        self.registry.set_debug(debug);
    }

    pub fn set_policy(&mut self, policy: FailurePolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Register a callback under a route.
    ///
    /// Returns the number of distinct callbacks now registered for the route.
    pub fn register(&mut self, route: &str, callback: Callback<E>) -> usize {
        self.registry.register(route, callback)
    }

    /// Add a hook run whenever the dispatched path differs from the previous
    /// one. It receives the previous path (if any) and the new one.
    pub fn on_route_change<F>(&mut self, hook: F)
    where
        F: FnMut(Option<&str>, &str) + 'static,
    {
        self.route_change_hooks.push(Box::new(hook));
    }

    /// The most recently dispatched path.
    pub fn current_route(&self) -> Option<&str> {
        self.current_route.as_deref()
    }

    pub fn registry(&self) -> &Registry<E> {
        &self.registry
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Run one dispatch cycle for a path.
    ///
    /// An absent path is treated as the empty path. Every callback registered
    /// under a matching route key runs before this returns, global key first,
    /// then each path prefix from shortest to longest.
    pub fn run<'p>(
        &mut self,
        path: impl Into<Option<&'p str>>,
        event: &E,
    ) -> Result<DispatchReport, DispatchError> {
        let path = path.into().unwrap_or_default();

        let route_changed = self.current_route.as_deref() != Some(path);
        if route_changed {
            let previous = self.current_route.replace(path.to_string());
            if self.debug {
                tracing::debug!(from = ?previous, to = %path, "Route changed");
            }
            for hook in &mut self.route_change_hooks {
                hook(previous.as_deref(), path);
            }
        } else if self.debug {
            tracing::debug!(path = %path, "Route re-triggered, running callbacks again");
        }

        self.view.reset_temp();

        let segment = path::top_segment(path);
        if self.view.ensure_view(segment) && self.debug {
            tracing::debug!(segment = %segment, "View data created");
        }

        let probes = path::probe_sequence(path);
        let mut report = DispatchReport {
            path: path.to_string(),
            route_changed,
            probes: Vec::new(),
            matched: Vec::new(),
            invoked: 0,
            failures: Vec::new(),
        };

        for key in &probes {
            let Some(handlers) = self.registry.handlers(key) else {
                continue;
            };
            if self.debug {
                tracing::debug!(route = %key, handlers = handlers.len(), "Running route callbacks");
            }
            report.matched.push(key.clone());

            for (index, callback) in handlers.iter().enumerate() {
                let mut cx = HandlerContext::new(event, path, key, segment, &mut self.view);
                report.invoked += 1;

                let Err(error) = callback.invoke(&mut cx) else {
                    continue;
                };
                match self.policy {
                    FailurePolicy::FailFast => {
                        return Err(DispatchError::Handler {
                            route: key.clone(),
                            index,
                            source: error,
                        });
                    }
                    FailurePolicy::Collect => {
                        report.failures.push(HandlerFailure {
                            route: key.clone(),
                            index,
                            source_text: callback.source().to_string(),
                            error,
                        });
                    }
                }
            }
        }

        report.probes = probes;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    fn recorder(log: &Log, name: &str) -> Callback<()> {
        let log = Rc::clone(log);
        let label = name.to_string();
        Callback::new(name, move |_cx| {
            log.borrow_mut().push(label.clone());
            Ok(())
        })
    }

    fn failing(name: &str) -> Callback<()> {
        let message = format!("{name} exploded");
        Callback::new(name, move |_cx| Err(message.clone().into()))
    }

    fn drain(log: &Log) -> Vec<String> {
        log.borrow_mut().drain(..).collect()
    }

    #[test]
    fn test_hierarchical_dispatch_order() {
        let log = Log::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("blog/23", recorder(&log, "post"));
        dispatcher.register("", recorder(&log, "global"));
        dispatcher.register("blog", recorder(&log, "blog"));
        dispatcher.register("blog/23/edit/extra", recorder(&log, "extra"));
        dispatcher.register("other", recorder(&log, "other"));

        let report = dispatcher.run("blog/23/edit", &()).unwrap();

        assert_eq!(drain(&log), vec!["global", "blog", "post"]);
        assert_eq!(report.probes, vec!["", "blog", "blog/23", "blog/23/edit"]);
        assert_eq!(report.matched, vec!["", "blog", "blog/23"]);
        assert_eq!(report.invoked, 3);
    }

    #[test]
    fn test_same_route_runs_again() {
        let log = Log::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("shop", recorder(&log, "shop"));

        let first = dispatcher.run("/shop", &()).unwrap();
        let second = dispatcher.run("/shop", &()).unwrap();

        assert!(first.route_changed);
        assert!(!second.route_changed);
        assert_eq!(drain(&log), vec!["shop", "shop"]);
    }

    #[test]
    fn test_absent_path_is_empty() {
        let log = Log::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("", recorder(&log, "global"));

        let report = dispatcher.run(None::<&str>, &()).unwrap();

        assert_eq!(report.path, "");
        assert_eq!(report.probes, vec![""]);
        assert_eq!(dispatcher.current_route(), Some(""));
        assert_eq!(drain(&log), vec!["global"]);
    }

    #[test]
    fn test_temp_reset_every_cycle() {
        let mut dispatcher: Dispatcher<()> = Dispatcher::new();
        dispatcher.view_mut().temp.insert("stale".into(), json!(1));
        dispatcher.run("blog", &()).unwrap();
        assert!(dispatcher.view().temp.is_empty());

        dispatcher.view_mut().temp.insert("stale".into(), json!(2));
        dispatcher.run("blog", &()).unwrap();
        assert!(dispatcher.view().temp.is_empty());
    }

    #[test]
    fn test_temp_visible_within_cycle() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register(
            "",
            Callback::new("mark", |cx| {
                cx.temp().insert("marked".into(), json!(true));
                Ok(())
            }),
        );
        dispatcher.register(
            "blog",
            Callback::new("check", |cx| {
                let marked = cx.temp().get("marked").cloned();
                cx.data().insert("saw_mark".into(), marked.unwrap_or_default());
                Ok(())
            }),
        );

        dispatcher.run("/blog", &()).unwrap();

        assert_eq!(dispatcher.view().view("blog").unwrap()["saw_mark"], json!(true));
        // Scratch data lives until the next cycle starts
        assert_eq!(dispatcher.view().temp["marked"], json!(true));
    }

    #[test]
    fn test_view_data_created_once() {
        let mut dispatcher: Dispatcher<()> = Dispatcher::new();
        dispatcher.run("shop/42", &()).unwrap();
        assert!(dispatcher.view().view("shop").unwrap().is_empty());

        dispatcher.view_mut().view_mut("shop").insert("cart".into(), json!([42]));
        dispatcher.run("shop/43", &()).unwrap();
        assert_eq!(dispatcher.view().view("shop").unwrap()["cart"], json!([42]));
    }

    #[test]
    fn test_fail_fast_aborts_cycle() {
        let log = Log::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher.register("", recorder(&log, "global"));
        dispatcher.register("blog", failing("broken"));
        dispatcher.register("blog", recorder(&log, "after"));
        dispatcher.register("blog/1", recorder(&log, "deeper"));

        let err = dispatcher.run("blog/1", &()).unwrap_err();

        let DispatchError::Handler { route, index, source } = err;
        assert_eq!(route, "blog");
        assert_eq!(index, 0);
        assert_eq!(source.to_string(), "broken exploded");
        assert_eq!(drain(&log), vec!["global"]);
    }

    #[test]
    fn test_collect_policy_runs_everything() {
        let log = Log::default();
        let mut dispatcher = Dispatcher::new();
        dispatcher.set_policy(FailurePolicy::Collect);
        dispatcher.register("blog", failing("broken"));
        dispatcher.register("blog", recorder(&log, "after"));
        dispatcher.register("blog/1", recorder(&log, "deeper"));

        let report = dispatcher.run("blog/1", &()).unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.invoked, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].route, "blog");
        assert_eq!(report.failures[0].source_text, "broken");
        assert_eq!(drain(&log), vec!["after", "deeper"]);
    }

    #[test]
    fn test_route_change_hook() {
        let changes: Rc<RefCell<Vec<(Option<String>, String)>>> = Rc::default();
        let mut dispatcher: Dispatcher<()> = Dispatcher::new();
        let sink = Rc::clone(&changes);
        dispatcher.on_route_change(move |from, to| {
            sink.borrow_mut().push((from.map(String::from), to.to_string()));
        });

        dispatcher.run("/blog", &()).unwrap();
        dispatcher.run("/blog", &()).unwrap();
        dispatcher.run("/shop", &()).unwrap();

        assert_eq!(
            *changes.borrow(),
            vec![
                (None, "/blog".to_string()),
                (Some("/blog".to_string()), "/shop".to_string()),
            ]
        );
    }

    #[test]
    fn test_callbacks_receive_event() {
        let mut dispatcher: Dispatcher<u32> = Dispatcher::new();
        dispatcher.register(
            "",
            Callback::new("store event", |cx: &mut HandlerContext<'_, u32>| {
                let event = *cx.event;
                cx.data().insert("event".into(), json!(event));
                Ok(())
            }),
        );

        dispatcher.run("/", &41).unwrap();
        dispatcher.run("/", &42).unwrap();

        assert_eq!(dispatcher.view().view("").unwrap()["event"], json!(42));
    }

    #[test]
    fn test_from_config() {
        let config = DispatchConfig {
            debug: true,
            failure_policy: FailurePolicy::Collect,
            dedup: DedupStrategy::Reference,
            ..Default::default()
        };
        let mut dispatcher: Dispatcher<()> = Dispatcher::from_config(&config);
        assert_eq!(dispatcher.policy(), FailurePolicy::Collect);

        let cb = Callback::new("same", |_cx| Ok(()));
        assert_eq!(dispatcher.register("a", cb.clone()), 1);
        assert_eq!(dispatcher.register("a", cb), 1);
        assert_eq!(dispatcher.register("a", Callback::new("same", |_cx| Ok(()))), 2);
        assert_eq!(dispatcher.registry().count("a"), 2);
        assert!(dispatcher.registry().contains("a"));
    }

    #[test]
    fn test_debug_toggle_keeps_behavior() {
        let run_with = |debug: bool| {
            let log = Log::default();
            let mut dispatcher = Dispatcher::new();
            dispatcher.set_debug(debug);
            dispatcher.set_policy(FailurePolicy::Collect);
            let counts = vec![
                dispatcher.register("", recorder(&log, "global")),
                dispatcher.register("blog", recorder(&log, "blog")),
                dispatcher.register("blog", recorder(&log, "blog")),
                dispatcher.register("blog", failing("broken")),
                dispatcher.register("blog/1", recorder(&log, "post")),
            ];

            let mut reports = Vec::new();
            for path in ["/blog/1", "/blog/1", "/shop", ""] {
                let report = dispatcher.run(path, &()).unwrap();
                reports.push((
                    report.route_changed,
                    report.matched,
                    report.invoked,
                    report.failures.len(),
                ));
            }
            (counts, reports, drain(&log), dispatcher.view().temp.len())
        };

        let quiet = run_with(false);
        let verbose = run_with(true);

        assert_eq!(quiet.0, vec![1, 1, 1, 2, 1]);
        assert_eq!(quiet.2[..3], ["global", "blog", "post"]);
        assert_eq!(quiet, verbose);
    }
}
