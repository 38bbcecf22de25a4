//! Runtime-wide configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::mailbox::BackpressureStrategy;

/// Where components actually run. Only `InProcess` is implemented today; the other variants
/// are accepted so application code can be written against the full surface ahead of the
/// multi-process backends landing, but they currently behave identically to `InProcess`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backend {
    #[default]
    InProcess,
    MultiProcessLocal,
    MultiProcessTcp,
}

/// Runtime-wide knobs, set once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    backend: Backend,
    default_mailbox_capacity: Option<usize>,
    default_backpressure: BackpressureStrategy,
    #[serde(with = "crate::util::duration_serde")]
    spawn_timeout: Duration,
    #[serde(with = "crate::util::duration_serde")]
    shutdown_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            default_mailbox_capacity: None,
            default_backpressure: BackpressureStrategy::default(),
            spawn_timeout: Duration::from_secs(5),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

impl RuntimeConfig {
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn default_mailbox_capacity(&self) -> Option<usize> {
        self.default_mailbox_capacity
    }

    pub fn default_backpressure(&self) -> BackpressureStrategy {
        self.default_backpressure
    }

    pub fn spawn_timeout(&self) -> Duration {
        self.spawn_timeout
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }
}

#[derive(Debug, Default)]
pub struct RuntimeConfigBuilder {
    config: RuntimeConfig,
}

impl RuntimeConfigBuilder {
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    /// `None` (the default) keeps mailboxes unbounded, matching the core contract.
    pub fn default_mailbox_capacity(mut self, capacity: Option<usize>) -> Self {
        self.config.default_mailbox_capacity = capacity;
        self
    }

    pub fn default_backpressure(mut self, strategy: BackpressureStrategy) -> Self {
        self.config.default_backpressure = strategy;
        self
    }

    pub fn spawn_timeout(mut self, timeout: Duration) -> Self {
        self.config.spawn_timeout = timeout;
        self
    }

    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout = timeout;
        self
    }

    pub fn build(self) -> RuntimeConfig {
        self.config
    }
}
