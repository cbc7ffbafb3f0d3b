//! # Document: the page a set of nodes lives in.
//!
//! Lookup by element id mirrors `$('#id')` on the host page: it may come back
//! empty, and callers pass that straight to the registry, which rejects it.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::node::NodeHandle;

/// A page of connected nodes.
#[derive(Default)]
pub struct Document {
    by_id: Mutex<HashMap<String, NodeHandle>>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connected element with the given id and inserts it.
    ///
    /// An element already registered under the same id is replaced (and
    /// disconnected), as a re-rendered partial would do.
    pub fn create_element(&self, element_id: &str) -> NodeHandle {
        let node = NodeHandle::new(Some(element_id));
        let prev = self
            .by_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(element_id.to_string(), node.clone());
        if let Some(prev) = prev {
            prev.remove();
        }
        node
    }

    /// Looks up a connected element by id.
    pub fn query(&self, element_id: &str) -> Option<NodeHandle> {
        self.by_id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(element_id)
            .filter(|n| n.is_connected())
            .cloned()
    }

    /// Removes a node from the page.
    ///
    /// Components attached to it are **not** disposed; that is the caller's
    /// job (see [`Registry::dispose_node`](crate::Registry::dispose_node)).
    pub fn remove(&self, node: &NodeHandle) {
        node.remove();
        let mut by_id = self.by_id.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = node.element_id() {
            if by_id.get(id).is_some_and(|n| n.same_node(node)) {
                by_id.remove(id);
            }
        }
    }

    /// Number of connected elements reachable by id.
    pub fn len(&self) -> usize {
        self.by_id.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True if no element is reachable by id.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_finds_created_element() {
        let doc = Document::new();
        let node = doc.create_element("contest-countdown-timer");
        assert_eq!(doc.query("contest-countdown-timer"), Some(node));
        assert!(doc.query("missing").is_none());
    }

    #[test]
    fn test_remove_hides_node_from_query() {
        let doc = Document::new();
        let node = doc.create_element("a");
        doc.remove(&node);
        assert!(!node.is_connected());
        assert!(doc.query("a").is_none());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_recreate_replaces_and_disconnects_previous() {
        let doc = Document::new();
        let first = doc.create_element("a");
        let second = doc.create_element("a");
        assert!(!first.is_connected());
        assert_eq!(doc.query("a"), Some(second));
        assert_eq!(doc.len(), 1);
    }
}
