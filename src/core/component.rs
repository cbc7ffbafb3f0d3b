//! # The attach contract.
//!
//! A component is any type that can live "on" a node: exactly one instance per
//! (node, attach key) pair, built lazily by the [`Registry`](crate::Registry).
//!
//! Building is split in two phases:
//! - [`Attach::construct`] pure state setup, no side effects;
//! - [`Attach::start`] side effects (first render, timers), run once, right
//!   after the instance is registered.
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use domattach::{Attach, AttachContext, NodeHandle, WeakNode};
//!
//! struct Greeter {
//!     node: WeakNode,
//!     name: String,
//! }
//!
//! impl Attach for Greeter {
//!     const KIND: &'static str = "vjGreeterInstance";
//!     type Options = String;
//!
//!     fn construct(node: &NodeHandle, name: String, _ctx: &AttachContext) -> Self {
//!         Self { node: node.downgrade(), name }
//!     }
//!
//!     fn start(self: Arc<Self>, _ctx: AttachContext) {
//!         if let Some(node) = self.node.upgrade() {
//!             node.set_text(format!("hello, {}", self.name));
//!         }
//!     }
//! }
//! ```

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::dom::{NodeHandle, NodeId};
use crate::events::{Bus, Event, EventKind};

/// A component that attaches to a node.
pub trait Attach: Send + Sync + Sized + 'static {
    /// Attach key partitioning the registry (one instance per node per key).
    const KIND: &'static str;

    /// Construction arguments. Ignored when the instance already exists.
    type Options;

    /// Builds the instance state. Must not have side effects.
    fn construct(node: &NodeHandle, options: Self::Options, ctx: &AttachContext) -> Self;

    /// Runs side effects once the instance is registered.
    ///
    /// Long-running work must stop when `ctx.token()` is cancelled.
    fn start(self: Arc<Self>, ctx: AttachContext) {
        let _ = ctx;
    }

    /// Teardown hook, called on disposal after the token is cancelled.
    fn dispose(&self) {}
}

/// What the registry hands a freshly constructed instance.
#[derive(Clone, Debug)]
pub struct AttachContext {
    kind: &'static str,
    node: NodeId,
    bus: Bus,
    token: CancellationToken,
    config: Arc<Config>,
}

impl AttachContext {
    pub(crate) fn new(
        kind: &'static str,
        node: NodeId,
        bus: Bus,
        token: CancellationToken,
        config: Arc<Config>,
    ) -> Self {
        Self {
            kind,
            node,
            bus,
            token,
            config,
        }
    }

    /// Attach key of the instance.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Node the instance is attached to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Per-instance token, cancelled when the instance is disposed.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Registry configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shared event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Publishes an event pre-filled with this instance's kind and node.
    pub fn publish(&self, kind: EventKind) {
        self.bus.publish(self.event(kind));
    }

    /// Builds an event pre-filled with this instance's kind and node.
    pub fn event(&self, kind: EventKind) -> Event {
        Event::new(kind).with_component(self.kind).with_node(self.node)
    }
}
