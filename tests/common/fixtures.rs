//! Test fixtures
//!
//! [`TestMetrics`] bundles a registry with the memory backend its groups
//! record into, so tests can drive the facade and inspect what reached the
//! backend.

use std::sync::Arc;
use umami::{Backend, Group, Level, Mask, MemoryBackend, Registry};

pub struct TestMetrics {
    pub registry: Registry,
    pub backend: MemoryBackend,
}

impl TestMetrics {
    /// Registry at `level` with the production mask
    pub fn new(level: Level) -> Self {
        Self::with_policy(level, Mask::PRODUCTION)
    }

    pub fn with_policy(level: Level, mask: Mask) -> Self {
        Self {
            registry: Registry::with_policy(level, mask),
            backend: MemoryBackend::new(),
        }
    }

    /// Registry with everything switched off
    pub fn disabled() -> Self {
        Self::new(Level::Disabled)
    }

    pub fn shared_backend(&self) -> Arc<dyn Backend> {
        Arc::new(self.backend.clone())
    }

    /// Group recording into the shared memory backend
    pub fn group(&self, name: &str) -> Arc<Group> {
        self.registry.new_group(name, self.shared_backend(), &[])
    }
}
