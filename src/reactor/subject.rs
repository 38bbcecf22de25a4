//! A tiny push-based stream primitive used to feed a reactor's pipeline.
//!
//! Each named source is a `Subject`: values are pushed in from the mailbox loop as `Emit`s
//! arrive, and `build_dag` wires `Subject`s together with ordinary `futures::Stream`
//! combinators (`map`, `filter`, `zip`, ...) to produce the pipeline's output stream(s).

use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::message::Payload;

const SUBJECT_BUFFER: usize = 1024;

/// The push half of a named input: `build_dag` never touches this directly, the host loop
/// does, each time an `Emit` arrives bound to this source.
#[derive(Clone)]
pub struct Subject {
    sender: broadcast::Sender<Payload>,
}

impl Subject {
    pub fn new() -> Self {
        let (sender, _rx) = broadcast::channel(SUBJECT_BUFFER);
        Self { sender }
    }

    /// Push a value in. Silently dropped if nothing is currently subscribed — mirrors emit's
    /// at-most-once, best-effort delivery rather than buffering for a future subscriber.
    pub fn push(&self, value: Payload) {
        let _ = self.sender.send(value);
    }

    /// A fresh `Stream` over everything pushed after this call.
    pub fn stream(&self) -> impl futures::Stream<Item = Payload> {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|item| async move { item.ok() })
    }
}

impl Default for Subject {
    fn default() -> Self {
        Self::new()
    }
}
