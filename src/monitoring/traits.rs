//! The observability seam: components report [`RuntimeEvent`]s to whatever [`Monitor`] the
//! runtime was configured with, without knowing whether it's a no-op, an in-memory ring
//! buffer, or something a host application plugged in.

use async_trait::async_trait;

use super::types::{Recorded, RuntimeEvent};

#[async_trait]
pub trait Monitor: Send + Sync {
    /// Record that `event` happened.
    async fn record(&self, event: RuntimeEvent);

    /// Return everything recorded so far, oldest first. Implementations that don't retain
    /// history (e.g. a no-op monitor, or one that forwards to an external sink) return an
    /// empty vec.
    async fn snapshot(&self) -> Vec<Recorded>;

    /// Discard any retained history.
    async fn reset(&self);
}
