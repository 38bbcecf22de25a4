//! Ambient observability: a small event taxonomy plus pluggable sinks.
mod in_memory;
mod noop;
mod traits;
mod types;

pub use in_memory::InMemoryMonitor;
pub use noop::NoopMonitor;
pub use traits::Monitor;
pub use types::{EventSeverity, Recorded, RuntimeEvent};
