//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to lifecycle events emitted by the registry and by the
//! components it manages.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Registry` (construct/reuse/dispose/invalid node),
//!   `CountdownTimer` (timer started/finished, malformed target).
//! - **Consumers**: `Registry::subscriber_listener()` (fans out to `SubscriberSet`),
//!   or any caller holding `Registry::bus().subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
