//! # Node handles with identity semantics.
//!
//! A [`NodeHandle`] is a cheap `Arc` clone. Two handles are equal only when
//! they point at the same element; two elements with identical content are
//! still different nodes.
//!
//! ## Rules
//! - Every node gets a fresh [`NodeId`] from a global counter (never reused).
//! - Text writes are counted, so callers can observe how often a component
//!   touched the node.
//! - `remove()` only flips the connected flag. It does not notify anyone.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Global identity counter.
static NODE_SEQ: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NODE_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Raw numeric value (for logs).
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct NodeInner {
    id: NodeId,
    element_id: Option<Arc<str>>,
    data: Mutex<HashMap<String, String>>,
    text: Mutex<String>,
    writes: AtomicU64,
    connected: AtomicBool,
}

/// Shared handle to a single element.
#[derive(Clone)]
pub struct NodeHandle {
    inner: Arc<NodeInner>,
}

impl NodeHandle {
    /// Creates a detached-from-any-document but connected node.
    ///
    /// Prefer [`Document::create_element`](crate::dom::Document::create_element)
    /// when the node should be reachable by id.
    pub fn new(element_id: Option<&str>) -> Self {
        Self {
            inner: Arc::new(NodeInner {
                id: NodeId::next(),
                element_id: element_id.map(Arc::from),
                data: Mutex::new(HashMap::new()),
                text: Mutex::new(String::new()),
                writes: AtomicU64::new(0),
                connected: AtomicBool::new(true),
            }),
        }
    }

    /// Builder-style data attribute setter (`data-<key>`).
    #[must_use]
    pub fn with_data(self, key: &str, value: impl Into<String>) -> Self {
        self.set_data(key, value);
        self
    }

    /// Identity of this node.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    /// Element id attribute, if any.
    pub fn element_id(&self) -> Option<&str> {
        self.inner.element_id.as_deref()
    }

    /// Reads a data attribute (`data-<key>`).
    pub fn data(&self, key: &str) -> Option<String> {
        self.inner
            .data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Sets a data attribute (`data-<key>`).
    pub fn set_data(&self, key: &str, value: impl Into<String>) {
        self.inner
            .data
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }

    /// Current text content.
    pub fn text(&self) -> String {
        self.inner
            .text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the whole text content and counts the write.
    pub fn set_text(&self, text: impl Into<String>) {
        let mut guard = self.inner.text.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = text.into();
        self.inner.writes.fetch_add(1, AtomicOrdering::Relaxed);
    }

    /// Number of `set_text` calls so far.
    pub fn writes(&self) -> u64 {
        self.inner.writes.load(AtomicOrdering::Relaxed)
    }

    /// True while the node is part of its page.
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(AtomicOrdering::Acquire)
    }

    /// Marks the node as gone from the page.
    pub fn remove(&self) {
        self.inner.connected.store(false, AtomicOrdering::Release);
    }

    /// Non-owning reference to this node.
    pub fn downgrade(&self) -> WeakNode {
        WeakNode {
            id: self.inner.id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Identity comparison.
    #[inline]
    pub fn same_node(&self, other: &NodeHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_node(other)
    }
}

impl Eq for NodeHandle {}

impl Hash for NodeHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("id", &self.inner.id)
            .field("element_id", &self.inner.element_id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Non-owning back-reference to a node.
///
/// Components hold this instead of a [`NodeHandle`]: they must not outlive
/// the node, and they must not keep it alive either.
#[derive(Clone)]
pub struct WeakNode {
    id: NodeId,
    inner: Weak<NodeInner>,
}

impl WeakNode {
    /// Identity of the referenced node (valid even after it is dropped).
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the node if it is still alive.
    pub fn upgrade(&self) -> Option<NodeHandle> {
        self.inner.upgrade().map(|inner| NodeHandle { inner })
    }
}

impl fmt::Debug for WeakNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakNode").field(&self.id).finish()
    }
}
