//! Convenience re-exports for application code.

pub use crate::actor::{Actor, ErrorAction, LoopingActor, Ticker};
pub use crate::config::{Backend, RuntimeConfig};
pub use crate::context::{ActorContext, ReactorContext, WindowContext};
pub use crate::error::RuntimeError;
pub use crate::message::{downcast_ref, payload, Message, Payload};
pub use crate::monitoring::{InMemoryMonitor, Monitor, NoopMonitor, RuntimeEvent};
pub use crate::reactor::{OutputStream, Reactor, Subject};
pub use crate::reference::{ActorRef, Kind, ReactorRef, Ref, WindowRef};
pub use crate::system::System;
pub use crate::window::{FixedWindow, SlidingWindow, Window, WindowAssigner};
pub use crate::ComponentId;
