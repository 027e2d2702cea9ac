//! Shared helpers for dispatch integration tests.

use std::cell::RefCell;
use std::rc::Rc;

use page_dispatch::routing::Callback;

/// Records the names of callbacks as they run.
#[derive(Clone, Default)]
pub struct Trace {
    names: Rc<RefCell<Vec<String>>>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// A callback that records `name`, using `name` as its source text.
    pub fn callback<E: 'static>(&self, name: &str) -> Callback<E> {
        let names = Rc::clone(&self.names);
        let label = name.to_string();
        Callback::new(name, move |_cx| {
            names.borrow_mut().push(label.clone());
            Ok(())
        })
    }

    /// Names recorded since the last call.
    pub fn take(&self) -> Vec<String> {
        self.names.borrow_mut().drain(..).collect()
    }
}
