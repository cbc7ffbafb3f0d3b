//! # domattach
//!
//! **domattach** manages components that live on page nodes: at most one
//! live instance per (node, attach key), built lazily on first use and torn
//! down explicitly when the node goes away.
//!
//! The crate ships one component on top of that contract, [`CountdownTimer`],
//! which renders a live `H:M:S` countdown into its node and switches to a
//! terminal text exactly once.
//!
//! ## Architecture
//! ```text
//!   page-ready (PageInit)        page-ready (other partial)
//!            │                             │
//!            ▼                             ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Registry                                                         │
//! │  - (attach key, NodeId) → instance      (RwLock<HashMap>)         │
//! │  - per-instance CancellationToken (child of the runtime token)    │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────────────┬─────────────────────────┬───────┘
//!        ▼                          ▼                         │
//!  ┌──────────────┐          ┌──────────────┐                 │
//!  │CountdownTimer│          │CountdownTimer│                 │
//!  │ interval task│          │  (finished)  │                 │
//!  └──────┬───────┘          └──────────────┘                 │
//!         │ set_text(H:M:S / "Finished")                      │
//!         ▼                                                   ▼
//!    NodeHandle                               Bus ──► SubscriberSet ──► LogWriter / custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! get_or_construct::<T>(node, opts)
//!   ├─► node missing/disconnected ─► Err(AttachError::InvalidNode)
//!   ├─► entry exists              ─► same Arc<T>, opts ignored
//!   └─► T::construct ─► insert ─► T::start(ctx)
//!
//! dispose::<T>(node) / dispose_node(node) / dispose_all()
//!   └─► ctx.token cancelled ─► T::dispose() ─► entry removed
//! ```
//!
//! Removing a node from its [`Document`] does not dispose anything: the
//! page-teardown code calls [`Registry::dispose_node`].
//!
//! ## Features
//! | Area           | Description                                              | Key types                              |
//! |----------------|----------------------------------------------------------|----------------------------------------|
//! | **Registry**   | Singleton-per-node instances, lazy construction, disposal| [`Registry`], [`Attach`]               |
//! | **Countdown**  | Live countdown with a terminal state                     | [`CountdownTimer`], [`Remaining`]      |
//! | **Nodes**      | Identity-compared node handles and a page document       | [`NodeHandle`], [`Document`]           |
//! | **Events**     | Lifecycle events and subscribers                         | [`Event`], [`Subscribe`]               |
//! | **Errors**     | Typed registry and input errors                          | [`AttachError`], [`TargetError`]       |
//! | **Config**     | Registry settings and component defaults                 | [`Config`]                             |
//!
//! ## Optional features
//! - `logging`: exports the built-in [`LogWriter`] subscriber (writes through `tracing`).
//!
//! ## Example
//! ```rust
//! use domattach::{Config, CountdownOptions, CountdownTimer, Document, Registry};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Registry::new(Config::default());
//!     let page = Document::new();
//!     page.create_element("contest-countdown-timer")
//!         .set_data("end-at", "2000-01-01T00:00:00Z");
//!
//!     let node = page.query("contest-countdown-timer");
//!     let timer = registry
//!         .get_or_construct::<CountdownTimer>(node.as_ref(), CountdownOptions::default())
//!         .await?;
//!
//!     assert!(timer.is_finished());
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```

mod clock;
mod config;
mod core;
mod dom;
mod error;
mod events;
mod pages;
mod subscribers;

pub mod components;

// ---- Public re-exports ----

pub use clock::{Clock, FixedClock, RuntimeClock};
pub use components::{
    CountdownOptions, CountdownTimer, Padding, Remaining, TickOutcome, parse_target,
};
pub use config::Config;
pub use crate::core::{Attach, AttachContext, Registry};
pub use dom::{Document, NodeHandle, NodeId, WeakNode};
pub use error::{AttachError, TargetError};
pub use events::{Bus, Event, EventKind};
pub use pages::{COUNTDOWN_ELEMENT_ID, COUNTDOWN_PAGES, PageInit};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
