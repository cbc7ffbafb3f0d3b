//! Host page node model.
//!
//! The registry keys instances by node **identity**, so this module only
//! models what components actually consume from a page: an element id, data
//! attributes, a text body that the owning component overwrites, and whether
//! the element is still connected.
//!
//! ## Contents
//! - [`NodeHandle`] shared, identity-compared handle to one element
//! - [`WeakNode`]   non-owning back-reference held by components
//! - [`NodeId`]     process-unique identity of a node
//! - [`Document`]   the page: creates, looks up and removes nodes

mod document;
mod node;

pub use document::Document;
pub use node::{NodeHandle, NodeId, WeakNode};
