//! Registry core: the attach contract and the instance registry.
//!
//! Internal modules:
//! - [`component`]: the [`Attach`] trait and the [`AttachContext`] handed to new instances;
//! - [`registry`]: the [`Registry`], one live instance per (node, attach key).

mod component;
mod registry;

pub use component::{Attach, AttachContext};
pub use registry::Registry;
