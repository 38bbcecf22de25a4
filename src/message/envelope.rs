//! The closed set of internal message kinds components exchange, plus the `Mail` wrapper
//! that pairs an envelope with the (optional) reference of whoever sent it.

use chrono::{DateTime, Utc};

use super::payload::Payload;
use crate::reference::Ref;

/// The internal message kinds every component dispatches on.
///
/// `User` carries an opaque application payload; general actors hand it to `receive`,
/// while reactors and windows treat it (like any message outside this closed set) as fatal.
#[derive(Debug, Clone)]
pub enum Envelope {
    /// Sent exactly once by `spawn`, before any other message.
    Init { args: Payload },
    /// A value produced on a named stream of the sender.
    Emit { value: Payload, stream: String },
    /// The sender wants future emits on `stream` delivered to it.
    Subscribe { stream: String },
    /// The sender no longer wants emits on `stream`.
    Unsubscribe { stream: String },
    /// Asks a reactor/window to bind its named `source` (ignored by windows) to `stream` of
    /// `upstream`.
    ReactTo {
        upstream: Ref,
        source: String,
        stream: String,
    },
    /// Delivered when a `send_self_after` timer elapses.
    Wakeup { payload: Payload },
    /// Opaque application-defined message.
    User(Payload),
    /// Internal-only: a reactor's independently-scheduled pipeline subscription asks the
    /// reactor's own mailbox loop to perform the actual `emit`, preserving the
    /// one-handler-at-a-time invariant even though the pipeline runs on its own task.
    SelfPublish { stream: String, value: Payload },
}

/// A message as it sits in a mailbox: the envelope plus who sent it (if anyone — the
/// system context sends without a component sender) and when it was enqueued.
#[derive(Debug, Clone)]
pub struct Mail {
    pub sender: Option<Ref>,
    pub body: Envelope,
    pub enqueued_at: DateTime<Utc>,
}

impl Mail {
    pub fn new(sender: Option<Ref>, body: Envelope) -> Self {
        Self {
            sender,
            body,
            enqueued_at: Utc::now(),
        }
    }
}
