//! Spawns a reactor: wires its declared sources to a user pipeline, then forwards pipeline
//! output back through the reactor's own mailbox so a single thread of control still owns
//! every emit, even though the pipeline runs as independently-scheduled tasks.

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;

use crate::component::PubSub;
use crate::context::ReactorContext;
use crate::error::RuntimeError;
use crate::mailbox::{bounded, unbounded, BackpressureStrategy};
use crate::message::{Envelope, Payload};
use crate::monitoring::{Monitor, RuntimeEvent};
use crate::reference::{Address, Kind, Ref, ReactorRef};
use crate::util::ComponentId;

use super::subject::Subject;
use super::traits::Reactor;

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

pub fn spawn<R: Reactor>(
    mut behavior: R,
    args: Payload,
    capacity: MailboxCapacity,
    monitor: Arc<dyn Monitor>,
) -> ReactorRef {
    let (tx, rx) = match capacity {
        MailboxCapacity::Unbounded => unbounded(),
        MailboxCapacity::Bounded(cap, strategy) => bounded(cap, strategy),
    };
    let address = Arc::new(Address::new(Kind::Reactor, tx));
    let reactor_ref = ReactorRef(address.clone());
    let self_ref: Ref = reactor_ref.clone().into();

    address.deliver(Some(self_ref.clone()), Envelope::Init { args });

    let sources: HashMap<String, Subject> = behavior
        .sources()
        .into_iter()
        .map(|name| (name, Subject::new()))
        .collect();

    tokio::spawn(run(behavior, self_ref, rx, sources, monitor));

    reactor_ref
}

async fn run<R: Reactor>(
    mut behavior: R,
    self_ref: Ref,
    mut mailbox: crate::mailbox::MailboxReceiver,
    sources: HashMap<String, Subject>,
    monitor: Arc<dyn Monitor>,
) {
    let mut pubsub = PubSub::with_monitor(monitor.clone());
    // (upstream id, their stream name, our source name). A plain `Vec` rather than a map
    // because the same (upstream, stream) pair may legitimately feed more than one source.
    let mut bindings: Vec<(ComponentId, String, String)> = Vec::new();
    let mut caused_by_error = false;

    while let Some(mail) = mailbox.recv().await {
        let outcome: Result<(), RuntimeError> = match mail.body {
            Envelope::Init { args } => {
                if !pubsub.mark_initialized() {
                    Err(RuntimeError::DoubleInit)
                } else {
                    let mut ctx = ReactorContext::new(&self_ref, &mut pubsub);
                    let outputs = behavior.build_dag(&mut ctx, &sources);
                    for (stream, output) in outputs {
                        let self_ref = self_ref.clone();
                        let stream_name = stream.clone();
                        tokio::spawn(async move {
                            let mut output = output;
                            while let Some(value) = output.next().await {
                                self_ref.deliver(
                                    Some(self_ref.clone()),
                                    Envelope::SelfPublish {
                                        stream: stream_name.clone(),
                                        value,
                                    },
                                );
                            }
                        });
                    }
                    monitor
                        .record(RuntimeEvent::ComponentSpawned {
                            id: self_ref.id(),
                            kind: Kind::Reactor,
                        })
                        .await;
                    Ok(())
                }
            }
            Envelope::ReactTo {
                upstream,
                source,
                stream,
            } => {
                if sources.contains_key(&source) {
                    upstream.subscribe(&self_ref, stream.clone());
                    bindings.push((upstream.id(), stream, source));
                    Ok(())
                } else {
                    Err(RuntimeError::UnknownMessage("ReactTo names an undeclared source"))
                }
            }
            Envelope::Emit { value, stream } => {
                if let Some(sender) = &mail.sender {
                    for (_, _, source) in bindings
                        .iter()
                        .filter(|(id, bound_stream, _)| *id == sender.id() && *bound_stream == stream)
                    {
                        if let Some(subject) = sources.get(source) {
                            subject.push(value.clone());
                        }
                    }
                }
                Ok(())
            }
            Envelope::SelfPublish { stream, value } => {
                pubsub.emit(&self_ref, value, &stream);
                Ok(())
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
            Envelope::Wakeup { .. } => Err(RuntimeError::UnknownMessage("Wakeup")),
            Envelope::User(_) => Err(RuntimeError::UnknownMessage("User")),
        };

        if let Err(err) = outcome {
            monitor
                .record(RuntimeEvent::HandlerError {
                    id: self_ref.id(),
                    message: err.to_string(),
                })
                .await;
            caused_by_error = true;
            break;
        }
    }

    monitor
        .record(RuntimeEvent::ComponentTerminated {
            id: self_ref.id(),
            kind: Kind::Reactor,
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

    struct Doubler;

    impl Reactor for Doubler {
        fn sources(&self) -> Vec<String> {
            vec!["in".to_string()]
        }

        fn build_dag(
            &mut self,
            _ctx: &mut ReactorContext<'_>,
            sources: &HashMap<String, Subject>,
        ) -> Vec<(String, super::super::traits::OutputStream)> {
            let input = sources["in"].stream();
            let doubled = input.filter_map(|value| async move {
                downcast_ref::<i32>(&value).map(|n| payload(n * 2))
            });
            vec![("out".to_string(), Box::pin(doubled))]
        }
    }

    #[tokio::test]
    async fn emits_mapped_values_on_named_output() {
        let monitor: Arc<dyn Monitor> = Arc::new(InMemoryMonitor::default());
        let (tx, mut rx) = unbounded();
        let sink = Arc::new(Address::new(Kind::Actor, tx));
        let sink_ref: Ref = crate::reference::ActorRef(sink).into();

        let reactor = spawn(Doubler, payload(()), MailboxCapacity::Unbounded, monitor);
        let reactor_ref: Ref = reactor.clone().into();
        // give Init time to run build_dag before we subscribe/bind.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        reactor.subscribe(&sink_ref, "out");

        let (producer_tx, _producer_rx) = unbounded();
        let producer = Arc::new(Address::new(Kind::Actor, producer_tx));
        let producer_ref: Ref = crate::reference::ActorRef(producer).into();
        reactor.react_to(&sink_ref, producer_ref.clone(), "in", "raw");

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        reactor_ref.deliver(
            Some(producer_ref.clone()),
            Envelope::Emit {
                value: payload(10_i32),
                stream: "raw".to_string(),
            },
        );

        let mail = rx.recv().await.unwrap();
        match mail.body {
            Envelope::Emit { value, stream } => {
                assert_eq!(stream, "out");
                assert_eq!(downcast_ref::<i32>(&value).copied(), Some(20));
            }
            other => panic!("unexpected envelope: {other:?}"),
        }
    }

    struct FanIn;

    impl Reactor for FanIn {
        fn sources(&self) -> Vec<String> {
            vec!["a".to_string(), "b".to_string()]
        }

        fn build_dag(
            &mut self,
            _ctx: &mut ReactorContext<'_>,
            sources: &HashMap<String, Subject>,
        ) -> Vec<(String, super::super::traits::OutputStream)> {
            let merged = futures::stream::select(sources["a"].stream(), sources["b"].stream());
            vec![("out".to_string(), Box::pin(merged))]
        }
    }

    #[tokio::test]
    async fn a_single_upstream_stream_can_feed_more_than_one_source() {
        let monitor: Arc<dyn Monitor> = Arc::new(InMemoryMonitor::default());
        let (tx, mut rx) = unbounded();
        let sink = Arc::new(Address::new(Kind::Actor, tx));
        let sink_ref: Ref = crate::reference::ActorRef(sink).into();

        let reactor = spawn(FanIn, payload(()), MailboxCapacity::Unbounded, monitor);
        let reactor_ref: Ref = reactor.clone().into();
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        reactor.subscribe(&sink_ref, "out");

        let (producer_tx, _producer_rx) = unbounded();
        let producer = Arc::new(Address::new(Kind::Actor, producer_tx));
        let producer_ref: Ref = crate::reference::ActorRef(producer).into();
        // Both sources are bound to the same upstream stream: one inbound Emit must feed both.
        reactor.react_to(&sink_ref, producer_ref.clone(), "a", "raw");
        reactor.react_to(&sink_ref, producer_ref.clone(), "b", "raw");

        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        reactor_ref.deliver(
            Some(producer_ref.clone()),
            Envelope::Emit {
                value: payload(7_i32),
                stream: "raw".to_string(),
            },
        );

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        for mail in [first, second] {
            match mail.body {
                Envelope::Emit { value, stream } => {
                    assert_eq!(stream, "out");
                    assert_eq!(downcast_ref::<i32>(&value).copied(), Some(7));
                }
                other => panic!("unexpected envelope: {other:?}"),
            }
        }
    }

    struct SourcelessConstant;

    impl Reactor for SourcelessConstant {
        fn sources(&self) -> Vec<String> {
            Vec::new()
        }

        fn build_dag(
            &mut self,
            _ctx: &mut ReactorContext<'_>,
            _sources: &HashMap<String, Subject>,
        ) -> Vec<(String, super::super::traits::OutputStream)> {
            Vec::new()
        }
    }

    #[tokio::test]
    async fn a_sourceless_reactor_spawns_and_initializes_fine() {
        let monitor: Arc<dyn Monitor> = Arc::new(InMemoryMonitor::default());
        let _reactor = spawn(SourcelessConstant, payload(()), MailboxCapacity::Unbounded, monitor.clone());
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(monitor
            .snapshot()
            .await
            .iter()
            .all(|r| !matches!(r.event, RuntimeEvent::HandlerError { .. })));
    }
}
