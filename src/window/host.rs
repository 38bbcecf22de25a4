//! Spawns a window: a single implicit upstream source, per-`(pane, key)` accumulation, and a
//! trigger rule driven by the latest-seen timestamp as a watermark proxy.

use std::collections::HashMap;
use std::sync::Arc;

use crate::component::PubSub;
use crate::context::WindowContext;
use crate::error::RuntimeError;
use crate::mailbox::{bounded, unbounded, BackpressureStrategy};
use crate::message::{Envelope, Payload};
use crate::monitoring::{Monitor, RuntimeEvent};
use crate::reference::{Address, Kind, Ref, WindowRef};
use crate::util::ComponentId;

use super::assigner::{Pane, WindowAssigner};
use super::traits::Window;

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

pub fn spawn<W: Window>(
    behavior: W,
    assigner: impl WindowAssigner,
    args: Payload,
    capacity: MailboxCapacity,
    monitor: Arc<dyn Monitor>,
) -> WindowRef {
    let (tx, rx) = match capacity {
        MailboxCapacity::Unbounded => unbounded(),
        MailboxCapacity::Bounded(cap, strategy) => bounded(cap, strategy),
    };
    let address = Arc::new(Address::new(Kind::Window, tx));
    let window_ref = WindowRef(address.clone());
    let self_ref: Ref = window_ref.clone().into();

    address.deliver(Some(self_ref.clone()), Envelope::Init { args });

    tokio::spawn(run(behavior, assigner, self_ref, rx, monitor));

    window_ref
}

async fn run<W: Window>(
    mut behavior: W,
    assigner: impl WindowAssigner,
    self_ref: Ref,
    mut mailbox: crate::mailbox::MailboxReceiver,
    monitor: Arc<dyn Monitor>,
) {
    let mut pubsub = PubSub::with_monitor(monitor.clone());
    let mut accumulators: HashMap<(Pane, W::Key), W::Acc> = HashMap::new();
    let mut bound_upstreams: Vec<(ComponentId, String)> = Vec::new();
    let mut watermark_ms = i64::MIN;
    let mut caused_by_error = false;

    while let Some(mail) = mailbox.recv().await {
        let outcome: Result<(), RuntimeError> = match mail.body {
            Envelope::Init { args: _ } => {
                if pubsub.mark_initialized() {
                    monitor
                        .record(RuntimeEvent::ComponentSpawned {
                            id: self_ref.id(),
                            kind: Kind::Window,
                        })
                        .await;
                    Ok(())
                } else {
                    Err(RuntimeError::DoubleInit)
                }
            }
            Envelope::ReactTo { upstream, stream, .. } => {
                upstream.subscribe(&self_ref, stream.clone());
                bound_upstreams.push((upstream.id(), stream));
                Ok(())
            }
            Envelope::Emit { value, stream } => {
                let matches_binding = mail.sender.as_ref().is_some_and(|sender| {
                    bound_upstreams
                        .iter()
                        .any(|(id, bound_stream)| sender.id() == *id && &stream == bound_stream)
                });
                if matches_binding {
                    let ts = behavior.timestamp(&value);
                    watermark_ms = watermark_ms.max(ts);
                    let key = behavior.key(&value);
                    for pane in assigner.assign(ts) {
                        let acc = accumulators.entry((pane, key.clone())).or_default();
                        behavior.add_to_window(acc, value.clone());
                    }

                    let fired: Vec<(Pane, W::Key)> = accumulators
                        .keys()
                        .filter(|(pane, _)| pane.1 < watermark_ms)
                        .cloned()
                        .collect();
                    for pane_key in fired {
                        if let Some(acc) = accumulators.remove(&pane_key) {
                            let (pane, key) = pane_key;
                            let mut ctx = WindowContext::new(&self_ref, &mut pubsub);
                            behavior.window_complete(&mut ctx, &key, pane, acc);
                            monitor
                                .record(RuntimeEvent::PaneTriggered {
                                    window: self_ref.id(),
                                    pane_start_ms: pane.0,
                                    pane_end_ms: pane.1,
                                })
                                .await;
                        }
                    }
                }
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
            Envelope::SelfPublish { .. } => Err(RuntimeError::UnknownMessage("SelfPublish")),
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
            kind: Kind::Window,
            caused_by_error,
        })
        .await;
}
