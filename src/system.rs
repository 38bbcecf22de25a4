//! The runtime entry point: spawns components and keeps a registry of who's alive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::actor::{self, Actor};
use crate::config::{Backend, RuntimeConfig};
use crate::error::RuntimeError;
use crate::message::Payload;
use crate::monitoring::{Monitor, NoopMonitor};
use crate::reactor::{self, Reactor};
use crate::reference::{ActorRef, ReactorRef, Ref, WindowRef};
use crate::util::ComponentId;
use crate::window::{self, Window, WindowAssigner};

/// Owns the runtime-wide config and a registry of every component spawned through it.
///
/// Mirrors the teacher's system handle: one entry point that owns configuration and hands
/// back addressable references, rather than components discovering each other implicitly.
pub struct System {
    config: RuntimeConfig,
    monitor: Arc<dyn Monitor>,
    registry: DashMap<ComponentId, Ref>,
    spawned_any: AtomicBool,
}

impl System {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_monitor(config, Arc::new(NoopMonitor))
    }

    pub fn with_monitor(config: RuntimeConfig, monitor: Arc<dyn Monitor>) -> Self {
        Self {
            config,
            monitor,
            registry: DashMap::new(),
            spawned_any: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Change the backend. Only legal before the first component is spawned (spec.md §9).
    pub fn set_backend(&mut self, backend: Backend) -> Result<(), RuntimeError> {
        if self.spawned_any.load(Ordering::Acquire) {
            return Err(RuntimeError::BackendAlreadyConfigured);
        }
        self.config = RuntimeConfig::builder()
            .backend(backend)
            .default_mailbox_capacity(self.config.default_mailbox_capacity())
            .default_backpressure(self.config.default_backpressure())
            .spawn_timeout(self.config.spawn_timeout())
            .shutdown_timeout(self.config.shutdown_timeout())
            .build();
        Ok(())
    }

    fn note_spawn(&self) {
        self.spawned_any.store(true, Ordering::Release);
    }

    fn actor_capacity(&self) -> actor::MailboxCapacity {
        match self.config.default_mailbox_capacity() {
            None => actor::MailboxCapacity::Unbounded,
            Some(cap) => actor::MailboxCapacity::Bounded(cap, self.config.default_backpressure()),
        }
    }

    fn reactor_capacity(&self) -> reactor::MailboxCapacity {
        match self.config.default_mailbox_capacity() {
            None => reactor::MailboxCapacity::Unbounded,
            Some(cap) => reactor::MailboxCapacity::Bounded(cap, self.config.default_backpressure()),
        }
    }

    fn window_capacity(&self) -> window::MailboxCapacity {
        match self.config.default_mailbox_capacity() {
            None => window::MailboxCapacity::Unbounded,
            Some(cap) => window::MailboxCapacity::Bounded(cap, self.config.default_backpressure()),
        }
    }

    pub fn spawn_actor<A: Actor>(&self, behavior: A, args: Payload) -> ActorRef {
        self.note_spawn();
        let actor_ref = actor::spawn(behavior, args, self.actor_capacity(), self.monitor.clone());
        let reference: Ref = actor_ref.clone().into();
        self.registry.insert(reference.id(), reference);
        actor_ref
    }

    pub fn spawn_reactor<R: Reactor>(&self, behavior: R, args: Payload) -> ReactorRef {
        self.note_spawn();
        let reactor_ref = reactor::spawn(behavior, args, self.reactor_capacity(), self.monitor.clone());
        let reference: Ref = reactor_ref.clone().into();
        self.registry.insert(reference.id(), reference);
        reactor_ref
    }

    pub fn spawn_window<W: Window>(
        &self,
        behavior: W,
        assigner: impl WindowAssigner,
        args: Payload,
    ) -> WindowRef {
        self.note_spawn();
        let window_ref = window::spawn(behavior, assigner, args, self.window_capacity(), self.monitor.clone());
        let reference: Ref = window_ref.clone().into();
        self.registry.insert(reference.id(), reference);
        window_ref
    }

    pub fn get(&self, id: ComponentId) -> Option<Ref> {
        self.registry.get(&id).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Forget about a component (its host loop may still be draining its mailbox; this only
    /// stops the system from handing out new references to it).
    pub fn forget(&self, id: ComponentId) {
        self.registry.remove(&id);
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.config.shutdown_timeout()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::ActorContext;
    use crate::message::payload;
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl Actor for Noop {
        async fn init(&mut self, _ctx: &mut ActorContext<'_>, _args: Payload) -> Result<(), RuntimeError> {
            Ok(())
        }

        async fn receive(&mut self, _ctx: &mut ActorContext<'_>, _message: Payload) -> Result<(), RuntimeError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn spawning_registers_and_locks_the_backend() {
        let mut system = System::new(RuntimeConfig::default());
        assert!(system.set_backend(Backend::MultiProcessLocal).is_ok());

        let reference = system.spawn_actor(Noop, payload(()));
        assert_eq!(system.len(), 1);
        assert!(system.get(reference.id()).is_some());

        assert!(matches!(
            system.set_backend(Backend::InProcess),
            Err(RuntimeError::BackendAlreadyConfigured)
        ));
    }
}
