//! Windows: per-`(pane, key)` accumulation over a single upstream source (spec.md §4.6).
mod assigner;
mod host;
mod traits;

pub use assigner::{FixedWindow, Pane, SlidingWindow, WindowAssigner};
pub use host::{spawn, MailboxCapacity};
pub use traits::Window;
