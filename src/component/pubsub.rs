//! Shared subscriber-list bookkeeping used by every component kind (spec.md §4.3).

use std::collections::HashMap;
use std::sync::Arc;

use crate::message::{Envelope, Payload};
use crate::monitoring::{Monitor, NoopMonitor, RuntimeEvent};
use crate::reference::Ref;

/// Per-stream subscriber lists plus the init-once flag, embedded in every component host.
pub struct PubSub {
    subscribers: HashMap<String, Vec<Ref>>,
    initialized: bool,
    monitor: Arc<dyn Monitor>,
}

impl Default for PubSub {
    fn default() -> Self {
        Self {
            subscribers: HashMap::new(),
            initialized: false,
            monitor: Arc::new(NoopMonitor),
        }
    }
}

impl PubSub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `PubSub` that reports failed deliveries from `emit` to `monitor`.
    pub fn with_monitor(monitor: Arc<dyn Monitor>) -> Self {
        Self {
            monitor,
            ..Self::default()
        }
    }

    /// Marks initialization done; returns `false` if this component was already initialized
    /// (a second `Init` is a fatal violation per spec.md §7).
    pub fn mark_initialized(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn subscribe(&mut self, stream: String, subscriber: Ref) {
        self.subscribers.entry(stream).or_default().push(subscriber);
    }

    /// Removes the first occurrence of `subscriber` on `stream`; a no-op if absent.
    pub fn unsubscribe(&mut self, stream: &str, subscriber: &Ref) {
        if let Some(list) = self.subscribers.get_mut(stream) {
            if let Some(pos) = list.iter().position(|r| r == subscriber) {
                list.remove(pos);
            }
        }
    }

    /// Fan out `Emit{value, stream}` from `from` to a snapshot of `stream`'s subscribers.
    /// Subscriber-set changes made during fan-out (by a callback a subscriber runs later)
    /// are not observed by this emit, since we iterate a cloned snapshot. `emit` itself stays
    /// synchronous (handler code calls it through `Context::emit`), so a failed delivery is
    /// reported to the monitor on its own task rather than by making every emit call async.
    pub fn emit(&self, from: &Ref, value: Payload, stream: &str) {
        let Some(list) = self.subscribers.get(stream) else {
            return;
        };
        let snapshot = list.clone();
        for subscriber in snapshot {
            let delivered = subscriber.deliver(
                Some(from.clone()),
                Envelope::Emit {
                    value: value.clone(),
                    stream: stream.to_string(),
                },
            );
            if !delivered {
                let monitor = self.monitor.clone();
                let target = subscriber.id();
                let reason = format!("mailbox closed or full on stream \"{stream}\"");
                tokio::spawn(async move {
                    monitor
                        .record(RuntimeEvent::MessageDropped { target, reason })
                        .await;
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::unbounded;
    use crate::message::payload;
    use crate::reference::{ActorRef, Address, Kind};
    use std::sync::Arc;

    fn actor_ref() -> (ActorRef, crate::mailbox::MailboxReceiver) {
        let (tx, rx) = unbounded();
        (ActorRef(Arc::new(Address::new(Kind::Actor, tx))), rx)
    }

    #[test]
    fn double_init_is_rejected() {
        let mut ps = PubSub::new();
        assert!(ps.mark_initialized());
        assert!(!ps.mark_initialized());
    }

    #[tokio::test]
    async fn subscribe_then_emit_delivers_once() {
        let mut ps = PubSub::new();
        let (sub, mut rx) = actor_ref();
        let sub_ref: Ref = sub.into();
        ps.subscribe("default".into(), sub_ref.clone());

        let (producer, _prx) = actor_ref();
        let producer_ref: Ref = producer.into();
        ps.emit(&producer_ref, payload(7_i32), "default");

        let mail = rx.recv().await.expect("message delivered");
        match mail.body {
            crate::message::Envelope::Emit { stream, .. } => assert_eq!(stream, "default"),
            _ => panic!("wrong envelope kind"),
        }
    }

    #[tokio::test]
    async fn emit_to_a_dropped_mailbox_reports_message_dropped() {
        use crate::monitoring::{InMemoryMonitor, RuntimeEvent};

        let monitor: Arc<dyn Monitor> = Arc::new(InMemoryMonitor::default());
        let mut ps = PubSub::with_monitor(monitor.clone());
        let (sub, rx) = actor_ref();
        let sub_ref: Ref = sub.into();
        ps.subscribe("default".into(), sub_ref);
        drop(rx);

        let (producer, _prx) = actor_ref();
        let producer_ref: Ref = producer.into();
        ps.emit(&producer_ref, payload(7_i32), "default");

        tokio::task::yield_now().await;
        assert!(monitor
            .snapshot()
            .await
            .iter()
            .any(|r| matches!(r.event, RuntimeEvent::MessageDropped { .. })));
    }

    #[test]
    fn double_subscribe_then_unsubscribe_restores_multiset() {
        let mut ps = PubSub::new();
        let (sub, _rx) = actor_ref();
        let sub_ref: Ref = sub.into();

        ps.subscribe("s".into(), sub_ref.clone());
        ps.subscribe("s".into(), sub_ref.clone());
        ps.unsubscribe("s", &sub_ref);
        ps.unsubscribe("s", &sub_ref);

        assert!(ps.subscribers.get("s").map(|l| l.is_empty()).unwrap_or(true));
    }
}
