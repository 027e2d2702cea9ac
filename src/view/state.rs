//! Persistent and per-cycle view data.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// A mapping of application state owned by one view.
pub type ViewData = Map<String, Value>;

/// View state shared by every callback of a dispatcher.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Top-level path segment -> accumulated state.
    /// Entries are created lazily and live for the whole session.
    pub data: HashMap<String, ViewData>,

    /// Scratch data, replaced with an empty mapping at the start of every
    /// dispatch cycle.
    pub temp: ViewData,
}

impl ViewState {
    /// Create empty view state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Persistent data for a view segment, if it was visited.
    pub fn view(&self, segment: &str) -> Option<&ViewData> {
        self.data.get(segment)
    }

    /// Persistent data for a view segment, created if absent.
    pub fn view_mut(&mut self, segment: &str) -> &mut ViewData {
        self.data.entry(segment.to_string()).or_default()
    }

    /// Make sure a view segment has an entry.
    /// Returns true if the entry was created by this call.
    pub fn ensure_view(&mut self, segment: &str) -> bool {
        if self.data.contains_key(segment) {
            return false;
        }
        self.data.insert(segment.to_string(), ViewData::new());
        true
    }

    /// Replace scratch data with an empty mapping.
    pub fn reset_temp(&mut self) {
        self.temp = ViewData::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ensure_view_is_lazy_and_preserving() {
        let mut state = ViewState::new();
        assert!(state.view("shop").is_none());

        assert!(state.ensure_view("shop"));
        assert!(state.view("shop").unwrap().is_empty());

        state.view_mut("shop").insert("cart".into(), json!(3));
        assert!(!state.ensure_view("shop"));
        assert_eq!(state.view("shop").unwrap()["cart"], json!(3));
    }

    #[test]
    fn test_reset_temp() {
        let mut state = ViewState::new();
        state.temp.insert("seen".into(), json!(true));
        state.view_mut("blog").insert("drafts".into(), json!(1));

        state.reset_temp();

        assert!(state.temp.is_empty());
        assert_eq!(state.view("blog").unwrap()["drafts"], json!(1));
    }
}
