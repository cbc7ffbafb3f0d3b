//! # Lifecycle events emitted by the registry and attached components.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Registry events**: instance construction, reuse, disposal, rejected nodes
//! - **Component events**: timer started/finished, malformed input data
//!
//! The [`Event`] struct carries the attach key, node identity and an optional
//! human-readable reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use domattach::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TargetMalformed)
//!     .with_component("vjCountdownTimerInstance")
//!     .with_reason("target_unparseable");
//!
//! assert_eq!(ev.kind, EventKind::TargetMalformed);
//! assert_eq!(ev.component, Some("vjCountdownTimerInstance"));
//! assert_eq!(ev.reason.as_deref(), Some("target_unparseable"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::dom::NodeId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Registry events ===
    /// A new instance was constructed and registered.
    ///
    /// Sets:
    /// - `component`: attach key
    /// - `node`: node identity
    InstanceConstructed,

    /// `get_or_construct` returned an existing instance; options were ignored.
    ///
    /// Sets:
    /// - `component`: attach key
    /// - `node`: node identity
    InstanceReused,

    /// An instance was removed from the registry and torn down.
    ///
    /// Sets:
    /// - `component`: attach key
    /// - `node`: node identity
    /// - `reason`: `"dispose"`, `"node_gone"` or `"shutdown"`
    InstanceDisposed,

    /// `dispose` found nothing to remove (no-op).
    ///
    /// Sets:
    /// - `component`: attach key
    /// - `node`: node identity
    DisposeMissed,

    /// Construction was rejected because the node handle is not valid.
    ///
    /// Sets:
    /// - `component`: attach key
    /// - `node`: node identity, if a handle was given at all
    /// - `reason`: rejection reason
    InvalidNode,

    // === Component events ===
    /// A repeating timer was armed.
    ///
    /// Sets:
    /// - `component`: attach key
    /// - `node`: node identity
    TimerStarted,

    /// A countdown reached its terminal state.
    ///
    /// Sets:
    /// - `component`: attach key
    /// - `node`: node identity
    TimerFinished,

    /// Input data on the node could not be read; the component degraded.
    ///
    /// Sets:
    /// - `component`: attach key
    /// - `node`: node identity
    /// - `reason`: error label
    TargetMalformed,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Attach key of the component involved.
    pub component: Option<&'static str>,
    /// Identity of the node involved.
    pub node: Option<NodeId>,
    /// Human-readable reason (error labels, disposal cause).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            component: None,
            node: None,
            reason: None,
        }
    }

    /// Attaches the component's attach key.
    #[inline]
    pub fn with_component(mut self, kind: &'static str) -> Self {
        self.component = Some(kind);
        self
    }

    /// Attaches a node identity.
    #[inline]
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::InstanceConstructed);
        let b = Event::new(EventKind::InstanceDisposed);
        assert!(b.seq > a.seq);
    }
}
