//! Reactors: pipelines built from named input streams with `futures::Stream` combinators
//! (spec.md §4.5).
mod host;
mod subject;
mod traits;

pub use host::{spawn, MailboxCapacity};
pub use subject::Subject;
pub use traits::{OutputStream, Reactor};
