//! The event taxonomy this runtime reports to a [`super::Monitor`].

use chrono::{DateTime, Utc};

use crate::reference::Kind;
use crate::util::ComponentId;

/// Relative importance of a [`RuntimeEvent`], used by monitors that filter or prioritize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSeverity {
    Debug,
    Info,
    Warn,
    Error,
}

/// Something worth reporting that happened inside the runtime, outside of the application's
/// own message flow.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A component finished spawning and processed its `Init`.
    ComponentSpawned { id: ComponentId, kind: Kind },
    /// A component's host loop exited, cleanly or otherwise.
    ComponentTerminated {
        id: ComponentId,
        kind: Kind,
        caused_by_error: bool,
    },
    /// A message could not be delivered (dead target, or a full bounded mailbox).
    MessageDropped { target: ComponentId, reason: String },
    /// A subscription to a named stream was added or removed.
    SubscriptionChanged {
        subscriber: ComponentId,
        publisher: ComponentId,
        stream: String,
        added: bool,
    },
    /// A window pane fired its accumulator to a user handler.
    PaneTriggered {
        window: ComponentId,
        pane_start_ms: i64,
        pane_end_ms: i64,
    },
    /// A handler raised an error while processing a message.
    HandlerError { id: ComponentId, message: String },
}

impl RuntimeEvent {
    pub fn severity(&self) -> EventSeverity {
        match self {
            RuntimeEvent::ComponentSpawned { .. } => EventSeverity::Info,
            RuntimeEvent::ComponentTerminated {
                caused_by_error, ..
            } => {
                if *caused_by_error {
                    EventSeverity::Error
                } else {
                    EventSeverity::Info
                }
            }
            RuntimeEvent::MessageDropped { .. } => EventSeverity::Warn,
            RuntimeEvent::SubscriptionChanged { .. } => EventSeverity::Debug,
            RuntimeEvent::PaneTriggered { .. } => EventSeverity::Debug,
            RuntimeEvent::HandlerError { .. } => EventSeverity::Error,
        }
    }

}

/// A recorded event, timestamped by the monitor at the moment it was received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub event: RuntimeEvent,
    pub at: DateTime<Utc>,
}
