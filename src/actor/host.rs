//! Spawns a general actor and drives its mailbox loop.

use std::collections::HashSet;
use std::sync::Arc;

use crate::component::PubSub;
use crate::context::ActorContext;
use crate::error::RuntimeError;
use crate::mailbox::{bounded, unbounded, BackpressureStrategy};
use crate::message::{Envelope, Payload};
use crate::monitoring::{Monitor, RuntimeEvent};
use crate::reference::{ActorRef, Address, Kind, Ref};

use super::traits::{Actor, ErrorAction};

/// Mailbox capacity for a newly spawned component.
#[derive(Debug, Clone, Copy)]
pub enum MailboxCapacity {
    Unbounded,
    Bounded(usize, BackpressureStrategy),
}

impl Default for MailboxCapacity {
    fn default() -> Self {
        Self::Unbounded
    }
}

/// Spawn `behavior`, immediately enqueuing `args` as its synthesized `Init`, and return a
/// handle other components can address.
pub fn spawn<A: Actor>(
    behavior: A,
    args: Payload,
    capacity: MailboxCapacity,
    monitor: Arc<dyn Monitor>,
) -> ActorRef {
    let (tx, rx) = match capacity {
        MailboxCapacity::Unbounded => unbounded(),
        MailboxCapacity::Bounded(cap, strategy) => bounded(cap, strategy),
    };
    let address = Arc::new(Address::new(Kind::Actor, tx));
    let actor_ref = ActorRef(address.clone());
    let self_ref: Ref = actor_ref.clone().into();

    // Init is always first: nothing else can reach this mailbox before we return actor_ref.
    address.deliver(Some(self_ref.clone()), Envelope::Init { args });

    tokio::spawn(run(behavior, self_ref, rx, monitor));

    actor_ref
}

async fn run<A: Actor>(
    mut behavior: A,
    self_ref: Ref,
    mut mailbox: crate::mailbox::MailboxReceiver,
    monitor: Arc<dyn Monitor>,
) {
    let mut pubsub = PubSub::with_monitor(monitor.clone());
    let mut monitors: HashSet<(crate::util::ComponentId, String)> = HashSet::new();
    let mut caused_by_error = false;

    while let Some(mail) = mailbox.recv().await {
        let outcome = match mail.body {
            Envelope::Init { args } => {
                if !pubsub.mark_initialized() {
                    monitor
                        .record(RuntimeEvent::HandlerError {
                            id: self_ref.id(),
                            message: "received Init more than once".into(),
                        })
                        .await;
                    Err(RuntimeError::DoubleInit)
                } else {
                    let mut ctx = ActorContext::new(&self_ref, &mut pubsub, &mut monitors);
                    let result = behavior.init(&mut ctx, args).await;
                    if result.is_ok() {
                        monitor
                            .record(RuntimeEvent::ComponentSpawned {
                                id: self_ref.id(),
                                kind: Kind::Actor,
                            })
                            .await;
                    }
                    result
                }
            }
            Envelope::Emit { value, stream } => {
                if let Some(sender) = &mail.sender {
                    if monitors.contains(&(sender.id(), stream.clone())) {
                        let sender = sender.clone();
                        let mut ctx = ActorContext::new(&self_ref, &mut pubsub, &mut monitors);
                        behavior
                            .on_monitored(&mut ctx, &sender, &stream, value)
                            .await
                    } else {
                        Ok(())
                    }
                } else {
                    Ok(())
                }
            }
            Envelope::Subscribe { stream } => {
                if let Some(sender) = mail.sender {
                    monitor
                        .record(RuntimeEvent::SubscriptionChanged {
                            subscriber: sender.id(),
                            publisher: self_ref.id(),
                            stream: stream.clone(),
                            added: true,
                        })
                        .await;
                    pubsub.subscribe(stream, sender);
                }
                Ok(())
            }
            Envelope::Unsubscribe { stream } => {
                if let Some(sender) = mail.sender {
                    monitor
                        .record(RuntimeEvent::SubscriptionChanged {
                            subscriber: sender.id(),
                            publisher: self_ref.id(),
                            stream: stream.clone(),
                            added: false,
                        })
                        .await;
                    pubsub.unsubscribe(&stream, &sender);
                }
                Ok(())
            }
            Envelope::Wakeup { payload } | Envelope::User(payload) => {
                let mut ctx = ActorContext::new(&self_ref, &mut pubsub, &mut monitors);
                behavior.receive(&mut ctx, payload).await
            }
            Envelope::ReactTo { .. } => Err(RuntimeError::UnknownMessage("ReactTo")),
            Envelope::SelfPublish { .. } => Err(RuntimeError::UnknownMessage("SelfPublish")),
        };

        if let Err(err) = outcome {
            monitor
                .record(RuntimeEvent::HandlerError {
                    id: self_ref.id(),
                    message: err.to_string(),
                })
                .await;
            if behavior.on_error(&err) == ErrorAction::Stop || err.is_fatal() {
                caused_by_error = true;
                break;
            }
        }
    }

    let mut ctx = ActorContext::new(&self_ref, &mut pubsub, &mut monitors);
    behavior.post_stop(&mut ctx).await;
    monitor
        .record(RuntimeEvent::ComponentTerminated {
            id: self_ref.id(),
            kind: Kind::Actor,
            caused_by_error,
        })
        .await;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::message::{downcast_ref, payload};
    use crate::monitoring::InMemoryMonitor;
    use async_trait::async_trait;

    struct Echo {
        out: ActorRef,
    }

    #[async_trait]
    impl Actor for Echo {
        async fn init(&mut self, _ctx: &mut ActorContext<'_>, _args: Payload) -> Result<(), RuntimeError> {
            Ok(())
        }

        async fn receive(&mut self, ctx: &mut ActorContext<'_>, message: Payload) -> Result<(), RuntimeError> {
            if let Some(n) = downcast_ref::<i32>(&message) {
                self.out.send(Some(ctx.self_ref()), payload(n * 2));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn receive_doubles_and_forwards() {
        let monitor: Arc<dyn Monitor> = Arc::new(InMemoryMonitor::default());
        let (tx, mut rx) = unbounded();
        let sink_address = Arc::new(Address::new(Kind::Actor, tx));
        let sink = ActorRef(sink_address);

        let echo = spawn(
            Echo { out: sink.clone() },
            payload(()),
            MailboxCapacity::Unbounded,
            monitor.clone(),
        );
        echo.send(None, payload(21_i32));

        let mail = rx.recv().await.unwrap();
        assert!(monitor
            .snapshot()
            .await
            .iter()
            .any(|r| matches!(r.event, RuntimeEvent::ComponentSpawned { .. })));
        match mail.body {
            Envelope::User(p) => assert_eq!(downcast_ref::<i32>(&p).copied(), Some(42)),
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    struct CountingMonitorTarget;

    #[async_trait]
    impl Actor for CountingMonitorTarget {
        async fn init(&mut self, _ctx: &mut ActorContext<'_>, _args: Payload) -> Result<(), RuntimeError> {
            Ok(())
        }

        async fn receive(&mut self, _ctx: &mut ActorContext<'_>, _message: Payload) -> Result<(), RuntimeError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn unknown_message_kind_is_fatal() {
        let monitor: Arc<dyn Monitor> = Arc::new(InMemoryMonitor::default());
        let actor = spawn(
            CountingMonitorTarget,
            payload(()),
            MailboxCapacity::Unbounded,
            monitor.clone(),
        );
        let other: Ref = actor.clone().into();
        actor.0.deliver(
            None,
            Envelope::ReactTo {
                upstream: other.clone(),
                source: "s".into(),
                stream: "out".into(),
            },
        );
        // give the host loop a chance to process and stop
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let snapshot = monitor.snapshot().await;
        assert!(snapshot
            .iter()
            .any(|r| matches!(r.event, RuntimeEvent::ComponentTerminated { caused_by_error: true, .. })));
    }
}
