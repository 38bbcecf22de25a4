use async_trait::async_trait;

use super::traits::Monitor;
use super::types::{Recorded, RuntimeEvent};

/// A monitor that discards everything. The runtime's default, so observability is opt-in.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

#[async_trait]
impl Monitor for NoopMonitor {
    async fn record(&self, _event: RuntimeEvent) {}

    async fn snapshot(&self) -> Vec<Recorded> {
        Vec::new()
    }

    async fn reset(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn discards_everything() {
        let monitor = NoopMonitor;
        monitor
            .record(RuntimeEvent::MessageDropped {
                target: crate::util::ComponentId::new(),
                reason: "test".into(),
            })
            .await;
        assert!(monitor.snapshot().await.is_empty());
    }
}
