//! Ambient operations handed to handler code as an explicit parameter.
//!
//! spec.md's design notes offer two equivalent realizations of "the current component has
//! ambient access to emit/subscribe/schedule": a task-local stack, or an explicit context
//! argument threaded through every handler call. We take the explicit-argument form, since a
//! task-local set before an `.await` is not guaranteed to still hold after it if the runtime
//! resumes the task on a different worker thread.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;

use crate::component::PubSub;
use crate::message::{payload, Envelope, Message, Payload};
use crate::reference::Ref;
use crate::util::ComponentId;

/// Operations common to every component kind: who am I, and how do I publish.
pub struct BaseContext<'a> {
    self_ref: &'a Ref,
    pubsub: &'a mut PubSub,
}

impl<'a> BaseContext<'a> {
    pub fn new(self_ref: &'a Ref, pubsub: &'a mut PubSub) -> Self {
        Self { self_ref, pubsub }
    }

    pub fn self_ref(&self) -> &Ref {
        self.self_ref
    }

    /// Publish `value` on one of this component's named output streams (spec.md §4.3).
    pub fn emit(&self, value: Payload, stream: impl AsRef<str>) {
        self.pubsub.emit(self.self_ref, value, stream.as_ref());
    }
}

/// Schedule a `Wakeup { payload }` to be delivered to `target` after `delay` has elapsed.
///
/// This is the one operation that needs its own task: there is no other way to have a
/// single-threaded mailbox loop "wait" without blocking the mailbox itself.
pub fn send_self_after(target: Ref, delay: Duration, wakeup_payload: Payload) {
    tokio::spawn(async move {
        sleep(delay).await;
        target.deliver(
            Some(target.clone()),
            Envelope::Wakeup {
                payload: wakeup_payload,
            },
        );
    });
}

/// Context available inside a general actor's handlers.
///
/// In addition to the base emit/self operations, actors may `monitor` a named stream of
/// another component: rather than receiving monitored emits through `receive` like any other
/// message, they are routed to a dedicated callback keyed by `(upstream id, stream)` (spec.md
/// §4.1). This corrects the source behavior of monitor registrations silently overwriting one
/// another when the same upstream was monitored on two different streams.
pub struct ActorContext<'a> {
    base: BaseContext<'a>,
    monitors: &'a mut HashSet<(ComponentId, String)>,
}

impl<'a> ActorContext<'a> {
    pub fn new(
        self_ref: &'a Ref,
        pubsub: &'a mut PubSub,
        monitors: &'a mut HashSet<(ComponentId, String)>,
    ) -> Self {
        Self {
            base: BaseContext::new(self_ref, pubsub),
            monitors,
        }
    }

    pub fn self_ref(&self) -> &Ref {
        self.base.self_ref()
    }

    pub fn emit(&self, value: Payload, stream: impl AsRef<str>) {
        self.base.emit(value, stream);
    }

    /// Start monitoring `stream` of `upstream`: subscribes to it and records the pair so the
    /// actor host routes future emits from it to the dedicated monitor callback instead of
    /// `receive`.
    pub fn monitor(&mut self, upstream: &Ref, stream: impl Into<String>) {
        let stream = stream.into();
        upstream.subscribe(self.base.self_ref, stream.clone());
        self.monitors.insert((upstream.id(), stream));
    }

    /// Stop monitoring `stream` of `upstream`.
    pub fn unmonitor(&mut self, upstream: &Ref, stream: impl Into<String>) {
        let stream = stream.into();
        upstream.unsubscribe(self.base.self_ref, stream.clone());
        self.monitors.remove(&(upstream.id(), stream));
    }

    pub fn is_monitored(&self, upstream_id: ComponentId, stream: &str) -> bool {
        self.monitors.contains(&(upstream_id, stream.to_string()))
    }

    /// Schedule a self-delivered wakeup (spec.md §4.4: `send_self_after`).
    pub fn send_self_after<T: Message>(&self, delay: Duration, wakeup_payload: T) {
        send_self_after(self.base.self_ref.clone(), delay, payload(wakeup_payload));
    }
}

/// Context available while building a reactor's pipeline and while it is running.
pub struct ReactorContext<'a> {
    base: BaseContext<'a>,
}

impl<'a> ReactorContext<'a> {
    pub fn new(self_ref: &'a Ref, pubsub: &'a mut PubSub) -> Self {
        Self {
            base: BaseContext::new(self_ref, pubsub),
        }
    }

    pub fn self_ref(&self) -> &Ref {
        self.base.self_ref()
    }

    pub fn emit(&self, value: Payload, stream: impl AsRef<str>) {
        self.base.emit(value, stream);
    }
}

/// Context available inside a window's accumulator callbacks.
pub struct WindowContext<'a> {
    base: BaseContext<'a>,
}

impl<'a> WindowContext<'a> {
    pub fn new(self_ref: &'a Ref, pubsub: &'a mut PubSub) -> Self {
        Self {
            base: BaseContext::new(self_ref, pubsub),
        }
    }

    pub fn self_ref(&self) -> &Ref {
        self.base.self_ref()
    }

    pub fn emit(&self, value: Payload, stream: impl AsRef<str>) {
        self.base.emit(value, stream);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mailbox::unbounded;
    use crate::reference::{ActorRef, Address, Kind};
    use std::sync::Arc;

    fn actor_ref() -> (Ref, crate::mailbox::MailboxReceiver) {
        let (tx, rx) = unbounded();
        (ActorRef(Arc::new(Address::new(Kind::Actor, tx))).into(), rx)
    }

    #[test]
    fn monitor_then_unmonitor_clears_registration() {
        let (me, _me_rx) = actor_ref();
        let (upstream, mut upstream_rx) = actor_ref();
        let mut pubsub = PubSub::new();
        let mut monitors = HashSet::new();
        let mut ctx = ActorContext::new(&me, &mut pubsub, &mut monitors);

        ctx.monitor(&upstream, "out");
        assert!(ctx.is_monitored(upstream.id(), "out"));
        ctx.unmonitor(&upstream, "out");
        assert!(!ctx.is_monitored(upstream.id(), "out"));

        // Both operations also attempted real Subscribe/Unsubscribe deliveries.
        upstream_rx.close();
    }

    #[tokio::test]
    async fn send_self_after_eventually_delivers_wakeup() {
        let (me, mut me_rx) = actor_ref();
        send_self_after(me, Duration::from_millis(1), payload(42_i32));
        let mail = me_rx.recv().await.unwrap();
        assert!(matches!(mail.body, Envelope::Wakeup { .. }));
    }
}
