//! Per-component mailboxes.
//!
//! The core contract (spec.md §5) treats mailboxes as conceptually unbounded and `send` as
//! non-blocking. This crate additionally offers bounded mailboxes with a configurable
//! [`BackpressureStrategy`], mirroring the teacher's `mailbox` module, for hosts that want to
//! cap memory use. `Block` degrades to `Error` here: delivery has no await point at the call
//! site to suspend on, so the only sound choice when full is to not enqueue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Notify};

use crate::message::Mail;

/// Capacity discipline for a component's mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BackpressureStrategy {
    /// Would wait for room; degrades to `Error` since delivery is non-blocking.
    Block,
    /// Reject (drop) the incoming message and report it to the monitor.
    #[default]
    Error,
    /// Drop the oldest queued message to make room for the new one.
    DropOldest,
    /// Drop the incoming message, keeping everything already queued.
    DropNewest,
}

/// Shared state backing a bounded mailbox: a capacity-bounded queue that, unlike
/// `tokio::sync::mpsc`, can be popped from the *sending* side to implement `DropOldest`.
struct BoundedQueue {
    items: Mutex<VecDeque<Mail>>,
    capacity: usize,
    strategy: BackpressureStrategy,
    notify: Notify,
    senders: AtomicUsize,
    closed: std::sync::atomic::AtomicBool,
}

enum SenderInner {
    Unbounded(mpsc::UnboundedSender<Mail>),
    Bounded(Arc<BoundedQueue>),
}

/// The sending half of a component's mailbox, cloneable and held by every `Ref`.
pub struct MailboxSender {
    inner: Arc<SenderInner>,
}

impl Clone for MailboxSender {
    fn clone(&self) -> Self {
        if let SenderInner::Bounded(queue) = self.inner.as_ref() {
            queue.senders.fetch_add(1, Ordering::SeqCst);
        }
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Drop for MailboxSender {
    fn drop(&mut self) {
        if let SenderInner::Bounded(queue) = self.inner.as_ref() {
            if queue.senders.fetch_sub(1, Ordering::SeqCst) == 1 {
                queue.notify.notify_one();
            }
        }
    }
}

/// The receiving half, owned exclusively by the component's host loop.
pub enum MailboxReceiver {
    Unbounded(mpsc::UnboundedReceiver<Mail>),
    Bounded(Arc<BoundedQueue>),
}

impl Drop for MailboxReceiver {
    fn drop(&mut self) {
        if let Self::Bounded(queue) = self {
            queue.closed.store(true, Ordering::SeqCst);
        }
    }
}

impl MailboxReceiver {
    pub async fn recv(&mut self) -> Option<Mail> {
        match self {
            Self::Unbounded(rx) => rx.recv().await,
            Self::Bounded(queue) => loop {
                {
                    let mut items = queue.items.lock();
                    if let Some(mail) = items.pop_front() {
                        return Some(mail);
                    }
                    if queue.senders.load(Ordering::SeqCst) == 0 {
                        return None;
                    }
                }
                queue.notify.notified().await;
            },
        }
    }
}

/// Create an unbounded mailbox (the spec's default: "conceptually unbounded").
pub fn unbounded() -> (MailboxSender, MailboxReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        MailboxSender {
            inner: Arc::new(SenderInner::Unbounded(tx)),
        },
        MailboxReceiver::Unbounded(rx),
    )
}

/// Create a bounded mailbox with the given capacity and backpressure strategy.
pub fn bounded(capacity: usize, strategy: BackpressureStrategy) -> (MailboxSender, MailboxReceiver) {
    let queue = Arc::new(BoundedQueue {
        items: Mutex::new(VecDeque::with_capacity(capacity)),
        capacity,
        strategy,
        notify: Notify::new(),
        senders: AtomicUsize::new(1),
        closed: std::sync::atomic::AtomicBool::new(false),
    });
    (
        MailboxSender {
            inner: Arc::new(SenderInner::Bounded(queue.clone())),
        },
        MailboxReceiver::Bounded(queue),
    )
}

impl MailboxSender {
    /// Non-blocking best-effort delivery. A target that no longer exists, or a full bounded
    /// mailbox under a dropping strategy, results in a silent drop (spec.md §4.1: "if the
    /// target no longer exists the message is silently dropped").
    ///
    /// Returns `true` if the message was actually enqueued, so callers can report a drop to
    /// the monitor without this module knowing about monitoring.
    pub fn deliver(&self, mail: Mail) -> bool {
        match self.inner.as_ref() {
            SenderInner::Unbounded(tx) => tx.send(mail).is_ok(),
            SenderInner::Bounded(queue) => {
                if queue.closed.load(Ordering::SeqCst) {
                    return false;
                }
                let mut items = queue.items.lock();
                if items.len() < queue.capacity {
                    items.push_back(mail);
                    drop(items);
                    queue.notify.notify_one();
                    true
                } else {
                    match queue.strategy {
                        BackpressureStrategy::Block
                        | BackpressureStrategy::Error
                        | BackpressureStrategy::DropNewest => false,
                        BackpressureStrategy::DropOldest => {
                            items.pop_front();
                            items.push_back(mail);
                            drop(items);
                            queue.notify.notify_one();
                            true
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::payload;
    use crate::message::Envelope;

    fn mail() -> Mail {
        Mail::new(None, Envelope::Wakeup { payload: payload(()) })
    }

    #[tokio::test]
    async fn unbounded_delivers() {
        let (tx, mut rx) = unbounded();
        assert!(tx.deliver(mail()));
        assert!(rx.recv().await.is_some());
    }

    #[tokio::test]
    async fn bounded_error_strategy_drops_when_full() {
        let (tx, _rx) = bounded(1, BackpressureStrategy::Error);
        assert!(tx.deliver(mail()));
        assert!(!tx.deliver(mail()));
    }

    #[tokio::test]
    async fn bounded_drop_oldest_evicts_the_front_of_the_queue() {
        let (tx, mut rx) = bounded(1, BackpressureStrategy::DropOldest);
        let first = Mail::new(None, Envelope::Wakeup { payload: payload(1_i32) });
        let second = Mail::new(None, Envelope::Wakeup { payload: payload(2_i32) });
        assert!(tx.deliver(first));
        assert!(tx.deliver(second));

        let received = rx.recv().await.unwrap();
        match received.body {
            Envelope::Wakeup { payload } => {
                assert_eq!(crate::message::downcast_ref::<i32>(&payload).copied(), Some(2));
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delivery_to_dropped_receiver_is_silent() {
        let (tx, rx) = unbounded();
        drop(rx);
        assert!(!tx.deliver(mail()));

        let (tx, rx) = bounded(4, BackpressureStrategy::Error);
        drop(rx);
        assert!(!tx.deliver(mail()));
    }

    #[tokio::test]
    async fn recv_returns_none_once_every_sender_is_dropped() {
        let (tx, mut rx) = bounded(4, BackpressureStrategy::Error);
        drop(tx);
        assert!(rx.recv().await.is_none());
    }
}
