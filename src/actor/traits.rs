//! The `Actor` trait and the general actor's lifecycle.

use async_trait::async_trait;

use crate::context::ActorContext;
use crate::error::RuntimeError;
use crate::message::Payload;
use crate::reference::Ref;

/// What a faulting handler should cause the host loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorAction {
    /// Log the error (via the monitor) and keep processing the mailbox.
    Resume,
    /// Stop the host loop; no further messages are processed.
    Stop,
}

/// A general actor: a unit of sequential, mailbox-driven state (spec.md §4.4).
///
/// Every method takes `&mut ActorContext` so handlers can emit, monitor other components, and
/// schedule self-wakeups without a task-local stack (see [`crate::context`]).
#[async_trait]
pub trait Actor: Send + 'static {
    /// Called exactly once, synthesized by `spawn` before any other message is processed.
    async fn init(&mut self, ctx: &mut ActorContext<'_>, args: Payload) -> Result<(), RuntimeError>;

    /// Called for every `Wakeup` and user-sent message.
    async fn receive(&mut self, ctx: &mut ActorContext<'_>, message: Payload) -> Result<(), RuntimeError>;

    /// Called for an `Emit` arriving on a stream this actor is monitoring (spec.md §4.1),
    /// instead of `receive`.
    async fn on_monitored(
        &mut self,
        _ctx: &mut ActorContext<'_>,
        _upstream: &Ref,
        _stream: &str,
        _value: Payload,
    ) -> Result<(), RuntimeError> {
        Ok(())
    }

    /// Decide how to react to a handler error. Defaults to stopping, matching the
    /// fail-fast posture used elsewhere for malformed dispatch.
    fn on_error(&mut self, _err: &RuntimeError) -> ErrorAction {
        ErrorAction::Stop
    }

    /// Called once the host loop has stopped processing messages, for any cleanup.
    async fn post_stop(&mut self, _ctx: &mut ActorContext<'_>) {}
}
