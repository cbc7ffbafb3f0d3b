//! # LogWriter: structured event logger
//!
//! A minimal subscriber that forwards every [`Event`] to `tracing`.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO [constructed] component="vjCountdownTimerInstance" node=#3
//! INFO [timer-started] component="vjCountdownTimerInstance" node=#3
//! INFO [timer-finished] component="vjCountdownTimerInstance" node=#3
//! WARN [target-malformed] component="vjCountdownTimerInstance" node=#4 reason="target_unparseable"
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let component = e.component.unwrap_or("unknown");
        let node = e.node.map(|n| n.get()).unwrap_or_default();
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::InstanceConstructed => {
                info!(seq = e.seq, component, node, "[constructed]");
            }
            EventKind::InstanceReused => {
                debug!(seq = e.seq, component, node, "[reused]");
            }
            EventKind::InstanceDisposed => {
                info!(seq = e.seq, component, node, reason, "[disposed]");
            }
            EventKind::DisposeMissed => {
                debug!(seq = e.seq, component, node, "[dispose-missed]");
            }
            EventKind::InvalidNode => {
                warn!(seq = e.seq, component, node, reason, "[invalid-node]");
            }
            EventKind::TimerStarted => {
                info!(seq = e.seq, component, node, "[timer-started]");
            }
            EventKind::TimerFinished => {
                info!(seq = e.seq, component, node, "[timer-finished]");
            }
            EventKind::TargetMalformed => {
                warn!(seq = e.seq, component, node, reason, "[target-malformed]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(all(test, feature = "logging"))]
mod tests {
    use super::*;
    use crate::dom::NodeHandle;

    #[tokio::test]
    async fn test_writes_every_event_kind() {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let writer = LogWriter::new();
        assert_eq!(writer.name(), "LogWriter");

        let node = NodeHandle::new(None).id();
        for kind in [
            EventKind::InstanceConstructed,
            EventKind::InstanceReused,
            EventKind::InstanceDisposed,
            EventKind::DisposeMissed,
            EventKind::InvalidNode,
            EventKind::TimerStarted,
            EventKind::TimerFinished,
            EventKind::TargetMalformed,
        ] {
            let ev = Event::new(kind)
                .with_component("vjCountdownTimerInstance")
                .with_node(node)
                .with_reason("target_unparseable");
            writer.on_event(&ev).await;
        }
        writer.on_event(&Event::new(EventKind::DisposeMissed)).await;
    }
}
