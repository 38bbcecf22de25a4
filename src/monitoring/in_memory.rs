use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::traits::Monitor;
use super::types::{Recorded, RuntimeEvent};

/// A monitor that keeps the last `capacity` events in memory, for tests and local debugging.
pub struct InMemoryMonitor {
    capacity: usize,
    events: Mutex<Vec<Recorded>>,
}

impl InMemoryMonitor {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryMonitor {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl Monitor for InMemoryMonitor {
    async fn record(&self, event: RuntimeEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.capacity {
            events.remove(0);
        }
        events.push(Recorded {
            event,
            at: Utc::now(),
        });
    }

    async fn snapshot(&self) -> Vec<Recorded> {
        self.events.lock().clone()
    }

    async fn reset(&self) {
        self.events.lock().clear();
    }
}
