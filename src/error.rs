//! Error types used by the attach registry and its components.
//!
//! This module defines two enums:
//!
//! - [`AttachError`]: structural errors raised by the [`Registry`](crate::Registry).
//!   These are surfaced synchronously to the caller and never retried.
//! - [`TargetError`]: data errors met while reading a component's input
//!   attributes. Components absorb these and degrade to a safe state.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use thiserror::Error;

use crate::dom::NodeId;

/// # Errors produced by the registry.
///
/// Nothing here is transient: there is no I/O, only validity checks.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttachError {
    /// The caller asked for an instance on a node that does not exist
    /// (empty selection) or is no longer connected to its document.
    #[error("invalid node for {kind}: {reason}")]
    InvalidNode {
        /// Attach key of the requested component.
        kind: &'static str,
        /// Why the handle was rejected.
        reason: &'static str,
    },

    /// An entry exists under this attach key but belongs to another Rust type.
    #[error("attach key {kind} on node {node} is held by a different component type")]
    KindMismatch {
        /// Attach key shared by both types.
        kind: &'static str,
        /// Node carrying the conflicting entry.
        node: NodeId,
    },
}

impl AttachError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use domattach::AttachError;
    ///
    /// let err = AttachError::InvalidNode { kind: "demo", reason: "missing" };
    /// assert_eq!(err.as_label(), "attach_invalid_node");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            AttachError::InvalidNode { .. } => "attach_invalid_node",
            AttachError::KindMismatch { .. } => "attach_kind_mismatch",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            AttachError::InvalidNode { kind, reason } => {
                format!("invalid node: kind={kind} reason={reason}")
            }
            AttachError::KindMismatch { kind, node } => {
                format!("kind mismatch: kind={kind} node={node}")
            }
        }
    }
}

/// # Errors produced while reading a countdown target.
///
/// Soft errors: the countdown never returns these to its caller, it reports
/// them on the bus and finishes immediately.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// The node carries no target attribute, or it is blank.
    #[error("target attribute is missing or empty")]
    Empty,

    /// The attribute is present but is not a recognizable date/time.
    #[error("unparseable target date: {raw:?}")]
    Unparseable {
        /// The raw attribute value.
        raw: String,
    },
}

impl TargetError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use domattach::TargetError;
    ///
    /// assert_eq!(TargetError::Empty.as_label(), "target_empty");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TargetError::Empty => "target_empty",
            TargetError::Unparseable { .. } => "target_unparseable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TargetError::Empty => "empty target".to_string(),
            TargetError::Unparseable { raw } => format!("unparseable: {raw}"),
        }
    }
}
