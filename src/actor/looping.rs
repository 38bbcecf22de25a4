//! `@loop(interval)` sugar: an actor whose `tick` is called on a fixed schedule.
//!
//! The reschedule happens at the *start* of the wakeup handler, before `tick` runs, so a
//! `tick` that takes longer than `interval` delays the next one rather than queuing a burst
//! of catch-up calls (spec.md §4.4).

use std::time::Duration;

use async_trait::async_trait;

use crate::context::ActorContext;
use crate::error::RuntimeError;
use crate::message::{payload, Payload};

use super::traits::Actor;

/// A marker payload for this actor's own wakeup; never observed by user code.
#[derive(Debug)]
struct LoopTick;

/// User-facing hook for a looping actor: just the periodic work and its period.
#[async_trait]
pub trait Ticker: Send + 'static {
    fn interval(&self) -> Duration;

    async fn tick(&mut self, ctx: &mut ActorContext<'_>) -> Result<(), RuntimeError>;
}

/// Adapts a [`Ticker`] into a full [`Actor`], handling the schedule/reschedule dance.
pub struct LoopingActor<T: Ticker> {
    inner: T,
}

impl<T: Ticker> LoopingActor<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: Ticker> Actor for LoopingActor<T> {
    async fn init(&mut self, ctx: &mut ActorContext<'_>, _args: Payload) -> Result<(), RuntimeError> {
        ctx.send_self_after(self.inner.interval(), LoopTick);
        Ok(())
    }

    async fn receive(&mut self, ctx: &mut ActorContext<'_>, message: Payload) -> Result<(), RuntimeError> {
        if crate::message::downcast_ref::<LoopTick>(&message).is_some() {
            ctx.send_self_after(self.inner.interval(), LoopTick);
            self.inner.tick(ctx).await
        } else {
            Ok(())
        }
    }
}
