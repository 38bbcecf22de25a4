//! Component references.
//!
//! A reference is an opaque, cloneable, comparable handle to a spawned component. The three
//! kinds (actor/reactor/window) only differ in which outbound operations are legal on them —
//! enforced here by giving each its own newtype with its own inherent methods, rather than by
//! a runtime tag check.

use std::sync::Arc;

use crate::mailbox::MailboxSender;
use crate::message::{Envelope, Mail};
use crate::util::ComponentId;

/// What kind of component a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Actor,
    Reactor,
    Window,
}

/// The routable identity behind every reference: an id, a kind tag, and a mailbox handle.
#[derive(Clone)]
pub struct Address {
    id: ComponentId,
    kind: Kind,
    mailbox: MailboxSender,
}

impl Address {
    pub fn new(kind: Kind, mailbox: MailboxSender) -> Self {
        Self {
            id: ComponentId::new(),
            kind,
            mailbox,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Non-blocking, at-most-once delivery; a dead target is a silent drop.
    pub fn deliver(&self, sender: Option<Ref>, body: Envelope) -> bool {
        self.mailbox.deliver(Mail::new(sender, body))
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Address {}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({:?}, {:?})", self.kind, self.id)
    }
}

macro_rules! ref_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(pub(crate) Arc<Address>);

        impl $name {
            pub fn id(&self) -> ComponentId {
                self.0.id()
            }

            /// Send a `Subscribe` for `stream` to this reference, attributed to `from`.
            pub fn subscribe(&self, from: &Ref, stream: impl Into<String>) {
                self.0.deliver(
                    Some(from.clone()),
                    Envelope::Subscribe {
                        stream: stream.into(),
                    },
                );
            }

            /// Send an `Unsubscribe` for `stream` to this reference, attributed to `from`.
            pub fn unsubscribe(&self, from: &Ref, stream: impl Into<String>) {
                self.0.deliver(
                    Some(from.clone()),
                    Envelope::Unsubscribe {
                        stream: stream.into(),
                    },
                );
            }
        }

        impl From<$name> for Ref {
            fn from(value: $name) -> Ref {
                Ref::$name(value)
            }
        }
    };
}

ref_newtype!(ActorRef);
ref_newtype!(ReactorRef);
ref_newtype!(WindowRef);

impl ActorRef {
    /// Send an opaque application message (spec.md §6: `ActorRef.send(msg)`).
    pub fn send(&self, from: Option<&Ref>, msg: crate::message::Payload) {
        self.0
            .deliver(from.cloned(), Envelope::User(msg));
    }
}

impl ReactorRef {
    /// Bind this reactor's named `source` to `stream` of `upstream` (spec.md §4.5).
    pub fn react_to(
        &self,
        from: &Ref,
        upstream: Ref,
        source: impl Into<String>,
        stream: impl Into<String>,
    ) {
        self.0.deliver(
            Some(from.clone()),
            Envelope::ReactTo {
                upstream,
                source: source.into(),
                stream: stream.into(),
            },
        );
    }
}

impl WindowRef {
    /// Bind this window's (single, implicit) source to `stream` of `upstream` (spec.md §4.6).
    pub fn react_to(&self, from: &Ref, upstream: Ref, stream: impl Into<String>) {
        self.0.deliver(
            Some(from.clone()),
            Envelope::ReactTo {
                upstream,
                source: String::new(),
                stream: stream.into(),
            },
        );
    }
}

/// A reference to any of the three component kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ref {
    Actor(ActorRef),
    Reactor(ReactorRef),
    Window(WindowRef),
}

impl Ref {
    pub fn id(&self) -> ComponentId {
        match self {
            Ref::Actor(r) => r.id(),
            Ref::Reactor(r) => r.id(),
            Ref::Window(r) => r.id(),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Ref::Actor(r) => r.0.kind(),
            Ref::Reactor(r) => r.0.kind(),
            Ref::Window(r) => r.0.kind(),
        }
    }

    pub(crate) fn deliver(&self, sender: Option<Ref>, body: Envelope) -> bool {
        match self {
            Ref::Actor(r) => r.0.deliver(sender, body),
            Ref::Reactor(r) => r.0.deliver(sender, body),
            Ref::Window(r) => r.0.deliver(sender, body),
        }
    }

    /// Send a `Subscribe` for `stream` to this reference, attributed to `from`. Any component
    /// kind can be a pub/sub target, so this dispatches to whichever concrete kind it is.
    pub fn subscribe(&self, from: &Ref, stream: impl Into<String>) {
        match self {
            Ref::Actor(r) => r.subscribe(from, stream),
            Ref::Reactor(r) => r.subscribe(from, stream),
            Ref::Window(r) => r.subscribe(from, stream),
        }
    }

    /// Send an `Unsubscribe` for `stream` to this reference, attributed to `from`.
    pub fn unsubscribe(&self, from: &Ref, stream: impl Into<String>) {
        match self {
            Ref::Actor(r) => r.unsubscribe(from, stream),
            Ref::Reactor(r) => r.unsubscribe(from, stream),
            Ref::Window(r) => r.unsubscribe(from, stream),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailbox::unbounded;

    #[test]
    fn refs_compare_by_identity_not_kind_alone() {
        let (tx, _rx) = unbounded();
        let a = ActorRef(Arc::new(Address::new(Kind::Actor, tx.clone())));
        let b = a.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn sending_to_a_dropped_mailbox_is_silent() {
        let (tx, rx) = unbounded();
        drop(rx);
        let a = ActorRef(Arc::new(Address::new(Kind::Actor, tx)));
        // Should not panic.
        a.send(None, crate::message::payload(1_i32));
    }

    #[tokio::test]
    async fn ref_subscribe_dispatches_to_the_underlying_kind() {
        let (tx, mut rx) = unbounded();
        let target: Ref = ActorRef(Arc::new(Address::new(Kind::Actor, tx))).into();
        let (from_tx, _from_rx) = unbounded();
        let from: Ref = ActorRef(Arc::new(Address::new(Kind::Actor, from_tx))).into();

        target.subscribe(&from, "out");

        let mail = rx.recv().await.expect("subscribe delivered");
        assert!(matches!(mail.body, Envelope::Subscribe { .. }));
    }
}
