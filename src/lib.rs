//! A runtime for streaming dataflow programs built from message-driven components.
//!
//! Three component kinds — [`actor`], [`reactor`], and [`window`] — run as independent
//! mailbox loops and talk only by exchanging async messages over named, subscribable
//! streams. There is no shared mutable state, and no blocking receive: everything a
//! component does in response to a message happens inside one of its own handler calls.

pub mod actor;
pub mod component;
pub mod config;
pub mod context;
pub mod error;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod reactor;
pub mod reference;
pub mod system;
mod util;
pub mod window;

pub mod prelude;

pub use error::RuntimeError;
pub use system::System;
pub use util::ComponentId;
