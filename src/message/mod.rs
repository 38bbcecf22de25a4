//! Opaque message payloads and the closed envelope set components dispatch on.

mod envelope;
mod payload;

pub use envelope::{Envelope, Mail};
pub use payload::{downcast_ref, payload, Message, Payload};
