//! # Attach registry - singleton-per-node component manager.
//!
//! Registry maps `(attach key, node identity)` to exactly one live instance:
//! - `get_or_construct` → returns the existing instance, or constructs,
//!   registers and starts a new one
//! - `get` → non-constructing lookup
//! - `dispose` → cancels the instance token, runs its teardown hook, removes it
//!
//! ## Architecture
//! ```text
//! page init ──► Registry.get_or_construct::<T>(node, opts)
//!                 ├─► node missing / disconnected → Err(InvalidNode), no entry
//!                 ├─► entry exists  → InstanceReused, return same Arc<T>
//!                 └─► entry missing → T::construct → insert → T::start(ctx)
//!                                                   (ctx.token = child of runtime token)
//!
//! page teardown ──► Registry.dispose::<T>(node) / dispose_node(node)
//!                 └─► token.cancel() → T::dispose() → InstanceDisposed
//! ```
//!
//! ## Rules
//! - Registry owns the entries (instance + teardown hook + CancellationToken)
//! - The write lock is held across check → construct → insert → start, so
//!   concurrent callers can never double-construct
//! - Removing a node from its document does **not** dispose anything; the
//!   caller signals that through `dispose_node`
//! - Disposing a missing entry is a no-op (`DisposeMissed`)

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::component::{Attach, AttachContext};
use crate::dom::{NodeHandle, NodeId};
use crate::error::AttachError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};

type Key = (&'static str, NodeId);

/// One registered instance.
struct Entry {
    /// Concrete type stored under the key.
    type_id: TypeId,
    /// The instance, type-erased.
    instance: Arc<dyn Any + Send + Sync>,
    /// Calls `Attach::dispose` on the concrete instance.
    teardown: Box<dyn Fn() + Send + Sync>,
    /// Individual cancellation token for this instance.
    cancel: CancellationToken,
}

impl Entry {
    fn downcast<T: Attach>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.instance).downcast::<T>().ok()
    }

    fn shutdown(self) {
        self.cancel.cancel();
        (self.teardown)();
    }
}

/// Registry of attached component instances.
pub struct Registry {
    cfg: Arc<Config>,
    entries: RwLock<HashMap<Key, Entry>>,
    bus: Bus,
    runtime_token: CancellationToken,
}

impl Registry {
    /// Creates a new registry.
    pub fn new(cfg: Config) -> Arc<Self> {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Arc::new(Self {
            cfg: Arc::new(cfg),
            entries: RwLock::new(HashMap::new()),
            bus,
            runtime_token: CancellationToken::new(),
        })
    }

    /// Creates a registry and forwards its events to `subscribers`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn with_subscribers(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Arc<Self> {
        let me = Self::new(cfg);
        me.subscriber_listener(SubscriberSet::new(subscribers));
        me
    }

    /// Subscribes to the bus and forwards events to the subscriber set (fire-and-forget).
    ///
    /// Events published before the runtime token is cancelled (such as the
    /// disposals from [`Registry::shutdown`]) are still delivered.
    fn subscriber_listener(&self, set: SubscriberSet) {
        let mut rx = self.bus.subscribe();
        let rt = self.runtime_token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "subscriber listener lagged");
                        }
                    },
                    _ = rt.cancelled() => break,
                }
            }
            loop {
                match rx.try_recv() {
                    Ok(ev) => set.emit(&ev),
                    Err(TryRecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "subscriber listener lagged");
                    }
                    Err(_) => break,
                }
            }
            set.shutdown().await;
        });
    }

    /// Event bus shared with every instance.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Registry configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Returns the instance for `(T::KIND, node)`, constructing it on first use.
    ///
    /// `options` are used only when a new instance is built; an existing
    /// instance is returned unchanged.
    ///
    /// # Errors
    /// - [`AttachError::InvalidNode`] when `node` is `None` or disconnected.
    /// - [`AttachError::KindMismatch`] when another type holds the same key.
    pub async fn get_or_construct<T: Attach>(
        &self,
        node: Option<&NodeHandle>,
        options: T::Options,
    ) -> Result<Arc<T>, AttachError> {
        let node = self.validate::<T>(node)?;
        let key = (T::KIND, node.id());

        let mut entries = self.entries.write().await;
        let existing = entries.get(&key).map(|entry| entry.downcast::<T>());
        if let Some(found) = existing {
            drop(entries);
            return match found {
                Some(instance) => {
                    self.bus.publish(
                        Event::new(EventKind::InstanceReused)
                            .with_component(T::KIND)
                            .with_node(node.id()),
                    );
                    Ok(instance)
                }
                None => Err(AttachError::KindMismatch {
                    kind: T::KIND,
                    node: node.id(),
                }),
            };
        }

        let ctx = AttachContext::new(
            T::KIND,
            node.id(),
            self.bus.clone(),
            self.runtime_token.child_token(),
            Arc::clone(&self.cfg),
        );
        let instance = Arc::new(T::construct(node, options, &ctx));

        let hook = Arc::clone(&instance);
        entries.insert(
            key,
            Entry {
                type_id: TypeId::of::<T>(),
                instance: Arc::clone(&instance) as Arc<dyn Any + Send + Sync>,
                teardown: Box::new(move || hook.dispose()),
                cancel: ctx.token().clone(),
            },
        );
        self.bus.publish(ctx.event(EventKind::InstanceConstructed));

        Arc::clone(&instance).start(ctx);
        drop(entries);

        Ok(instance)
    }

    /// Non-constructing lookup.
    pub async fn get<T: Attach>(&self, node: &NodeHandle) -> Option<Arc<T>> {
        let entries = self.entries.read().await;
        entries
            .get(&(T::KIND, node.id()))
            .and_then(|entry| entry.downcast::<T>())
    }

    /// Disposes the `T` instance on `node`. Returns false if there was none.
    pub async fn dispose<T: Attach>(&self, node: &NodeHandle) -> bool {
        let key = (T::KIND, node.id());
        let taken = {
            let mut entries = self.entries.write().await;
            let owned = entries
                .get(&key)
                .is_some_and(|entry| entry.type_id == TypeId::of::<T>());
            if owned {
                entries.remove(&key)
            } else {
                None
            }
        };

        match taken {
            Some(entry) => {
                self.finish_entry(key, entry, "dispose");
                true
            }
            None => {
                self.bus.publish(
                    Event::new(EventKind::DisposeMissed)
                        .with_component(T::KIND)
                        .with_node(node.id()),
                );
                false
            }
        }
    }

    /// Disposes every instance attached to `node` (the node is gone).
    ///
    /// Returns how many instances were disposed.
    pub async fn dispose_node(&self, node: &NodeHandle) -> usize {
        let id = node.id();
        let taken = self.take_where(|(_, n)| *n == id).await;
        let count = taken.len();
        for (key, entry) in taken {
            self.finish_entry(key, entry, "node_gone");
        }
        count
    }

    /// Disposes every instance (application shutdown).
    pub async fn dispose_all(&self) {
        let taken = self.take_where(|_| true).await;
        for (key, entry) in taken {
            self.finish_entry(key, entry, "shutdown");
        }
    }

    /// Disposes everything and stops the subscriber listener.
    pub async fn shutdown(&self) {
        self.dispose_all().await;
        self.runtime_token.cancel();
    }

    /// Sorted attach keys currently held by `node`.
    pub async fn kinds_of(&self, node: &NodeHandle) -> Vec<&'static str> {
        let entries = self.entries.read().await;
        let mut kinds: Vec<&'static str> = entries
            .keys()
            .filter(|(_, n)| *n == node.id())
            .map(|(kind, _)| *kind)
            .collect();
        kinds.sort_unstable();
        kinds
    }

    /// Number of live instances.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    // ---------------------------
    // Helpers
    // ---------------------------

    fn validate<'a, T: Attach>(
        &self,
        node: Option<&'a NodeHandle>,
    ) -> Result<&'a NodeHandle, AttachError> {
        let (reason, id) = match node {
            Some(n) if n.is_connected() => return Ok(n),
            Some(n) => ("node_disconnected", Some(n.id())),
            None => ("node_missing", None),
        };

        let mut ev = Event::new(EventKind::InvalidNode)
            .with_component(T::KIND)
            .with_reason(reason);
        if let Some(id) = id {
            ev = ev.with_node(id);
        }
        self.bus.publish(ev);

        Err(AttachError::InvalidNode {
            kind: T::KIND,
            reason,
        })
    }

    /// Atomically remove all matching entries.
    async fn take_where(&self, pred: impl Fn(&Key) -> bool) -> Vec<(Key, Entry)> {
        let mut entries = self.entries.write().await;
        let keys: Vec<Key> = entries.keys().filter(|k| pred(k)).copied().collect();
        keys.into_iter()
            .filter_map(|k| entries.remove(&k).map(|e| (k, e)))
            .collect()
    }

    /// Cancel token, run teardown hook, report.
    fn finish_entry(&self, (kind, node): Key, entry: Entry, reason: &'static str) {
        entry.shutdown();
        self.bus.publish(
            Event::new(EventKind::InstanceDisposed)
                .with_component(kind)
                .with_node(node)
                .with_reason(reason),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::WeakNode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Probe {
        node: WeakNode,
        label: String,
        token: std::sync::Mutex<Option<CancellationToken>>,
        disposed: AtomicUsize,
    }

    impl Attach for Probe {
        const KIND: &'static str = "probeInstance";
        type Options = String;

        fn construct(node: &NodeHandle, label: String, _ctx: &AttachContext) -> Self {
            Self {
                node: node.downgrade(),
                label,
                token: std::sync::Mutex::new(None),
                disposed: AtomicUsize::new(0),
            }
        }

        fn start(self: Arc<Self>, ctx: AttachContext) {
            if let Some(node) = self.node.upgrade() {
                node.set_text(self.label.clone());
            }
            *self.token.lock().expect("lock") = Some(ctx.token().clone());
        }

        fn dispose(&self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Shares `Probe`'s attach key on purpose.
    struct Impostor;

    impl Attach for Impostor {
        const KIND: &'static str = "probeInstance";
        type Options = ();

        fn construct(_node: &NodeHandle, _: (), _ctx: &AttachContext) -> Self {
            Impostor
        }
    }

    struct Other;

    impl Attach for Other {
        const KIND: &'static str = "otherInstance";
        type Options = ();

        fn construct(_node: &NodeHandle, _: (), _ctx: &AttachContext) -> Self {
            Other
        }
    }

    #[tokio::test]
    async fn test_get_or_construct_returns_same_instance() {
        let reg = Registry::new(Config::default());
        let node = NodeHandle::new(Some("n"));

        let a = reg
            .get_or_construct::<Probe>(Some(&node), "first".into())
            .await
            .expect("construct");
        let b = reg
            .get_or_construct::<Probe>(Some(&node), "second".into())
            .await
            .expect("reuse");

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.label, "first");
        assert_eq!(node.text(), "first");
        assert_eq!(node.writes(), 1);
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test]
    async fn test_distinct_nodes_and_kinds_get_distinct_instances() {
        let reg = Registry::new(Config::default());
        let n1 = NodeHandle::new(None);
        let n2 = NodeHandle::new(None);

        let a = reg.get_or_construct::<Probe>(Some(&n1), "a".into()).await.expect("a");
        let b = reg.get_or_construct::<Probe>(Some(&n2), "b".into()).await.expect("b");
        reg.get_or_construct::<Other>(Some(&n1), ()).await.expect("other");

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(reg.kinds_of(&n1).await, vec!["otherInstance", "probeInstance"]);
        assert_eq!(reg.len().await, 3);
    }

    #[tokio::test]
    async fn test_missing_or_disconnected_node_is_rejected_without_entry() {
        let reg = Registry::new(Config::default());
        let mut rx = reg.bus().subscribe();

        let err = reg
            .get_or_construct::<Probe>(None, "x".into())
            .await
            .err()
            .expect("missing node must fail");
        assert_eq!(err.as_label(), "attach_invalid_node");
        assert_eq!(
            rx.recv().await.expect("event").kind,
            EventKind::InvalidNode
        );

        let node = NodeHandle::new(None);
        node.remove();
        let err = reg
            .get_or_construct::<Probe>(Some(&node), "x".into())
            .await
            .err()
            .expect("disconnected node must fail");
        assert_eq!(
            err,
            AttachError::InvalidNode {
                kind: "probeInstance",
                reason: "node_disconnected"
            }
        );
        assert!(reg.is_empty().await);
        assert!(reg.get::<Probe>(&node).await.is_none());
    }

    #[tokio::test]
    async fn test_get_does_not_construct() {
        let reg = Registry::new(Config::default());
        let node = NodeHandle::new(None);

        assert!(reg.get::<Probe>(&node).await.is_none());
        assert!(reg.is_empty().await);
        assert_eq!(node.writes(), 0);
    }

    #[tokio::test]
    async fn test_dispose_cancels_and_allows_fresh_instance() {
        let reg = Registry::new(Config::default());
        let node = NodeHandle::new(None);

        let first = reg
            .get_or_construct::<Probe>(Some(&node), "one".into())
            .await
            .expect("construct");
        let token = first.token.lock().expect("lock").clone().expect("started");

        assert!(reg.dispose::<Probe>(&node).await);
        assert!(token.is_cancelled());
        assert_eq!(first.disposed.load(Ordering::SeqCst), 1);
        assert!(reg.get::<Probe>(&node).await.is_none());

        let second = reg
            .get_or_construct::<Probe>(Some(&node), "two".into())
            .await
            .expect("reconstruct");
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.label, "two");
        assert_eq!(node.text(), "two");
    }

    #[tokio::test]
    async fn test_dispose_missing_is_noop() {
        let reg = Registry::new(Config::default());
        let node = NodeHandle::new(None);
        let mut rx = reg.bus().subscribe();

        assert!(!reg.dispose::<Probe>(&node).await);
        assert_eq!(
            rx.recv().await.expect("event").kind,
            EventKind::DisposeMissed
        );
    }

    #[tokio::test]
    async fn test_same_key_different_type_is_kind_mismatch() {
        let reg = Registry::new(Config::default());
        let node = NodeHandle::new(None);
        reg.get_or_construct::<Probe>(Some(&node), "p".into()).await.expect("probe");

        let err = reg
            .get_or_construct::<Impostor>(Some(&node), ())
            .await
            .err()
            .expect("mismatch");
        assert_eq!(err.as_label(), "attach_kind_mismatch");
        assert!(reg.get::<Impostor>(&node).await.is_none());
        assert!(!reg.dispose::<Impostor>(&node).await);
        assert!(reg.get::<Probe>(&node).await.is_some());
    }

    #[tokio::test]
    async fn test_dispose_node_and_dispose_all() {
        let reg = Registry::new(Config::default());
        let n1 = NodeHandle::new(None);
        let n2 = NodeHandle::new(None);
        reg.get_or_construct::<Probe>(Some(&n1), "a".into()).await.expect("a");
        reg.get_or_construct::<Other>(Some(&n1), ()).await.expect("b");
        let kept = reg.get_or_construct::<Probe>(Some(&n2), "c".into()).await.expect("c");

        n1.remove();
        assert_eq!(reg.len().await, 3, "removing a node does not dispose");

        assert_eq!(reg.dispose_node(&n1).await, 2);
        assert_eq!(reg.len().await, 1);

        reg.shutdown().await;
        assert!(reg.is_empty().await);
        assert_eq!(kept.disposed.load(Ordering::SeqCst), 1);
    }

    struct Recorder(std::sync::Mutex<Vec<EventKind>>);

    #[async_trait::async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, event: &Event) {
            self.0.lock().expect("lock").push(event.kind);
        }
    }

    #[tokio::test]
    async fn test_subscribers_see_disposals_from_shutdown() {
        for _ in 0..50 {
            let recorder = Arc::new(Recorder(std::sync::Mutex::new(Vec::new())));
            let reg = Registry::with_subscribers(
                Config::default(),
                vec![recorder.clone() as Arc<dyn Subscribe>],
            );
            let node = NodeHandle::new(None);
            reg.get_or_construct::<Other>(Some(&node), ()).await.expect("construct");
            tokio::task::yield_now().await;

            reg.shutdown().await;
            tokio::time::timeout(std::time::Duration::from_secs(5), async {
                while recorder.0.lock().expect("lock").len() < 2 {
                    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                }
            })
            .await
            .expect("subscriber never saw the disposal");

            assert_eq!(
                *recorder.0.lock().expect("lock"),
                vec![EventKind::InstanceConstructed, EventKind::InstanceDisposed]
            );
        }
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_instance() {
        let reg = Registry::new(Config::default());
        let node = NodeHandle::new(None);

        let (a, b) = tokio::join!(
            reg.get_or_construct::<Probe>(Some(&node), "x".into()),
            reg.get_or_construct::<Probe>(Some(&node), "y".into()),
        );
        assert!(Arc::ptr_eq(&a.expect("a"), &b.expect("b")));
        assert_eq!(node.writes(), 1);
    }
}
