//! General actors: sequential, mailbox-driven components (spec.md §4.4).
mod host;
mod looping;
mod traits;

pub use host::{spawn, MailboxCapacity};
pub use looping::{LoopingActor, Ticker};
pub use traits::{Actor, ErrorAction};
