//! State shared by every component kind, independent of what runs inside a handler.
pub mod pubsub;

pub use pubsub::PubSub;
