//! Configuration management for metrics
//!
//! This module handles loading, validating and applying metrics configuration.

mod loader;
mod models;


pub use loader::{
    ENV_BACKEND, ENV_GROUP_PREFIX, ENV_LEVEL, ENV_MASK, load_config_with_precedence,
    merge_configs,
};
pub use models::*;

use crate::policy::LevelOpts;
use crate::registry::Registry;
use crate::utils::error::{MetricsError, Result};
use tracing::{debug, info, warn};

/// Configuration validation trait
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for MetricsConfig {
    fn validate(&self) -> Result<()> {
        if self.backend.kind.trim().is_empty() {
            return Err(MetricsError::config("Backend type cannot be empty"));
        }
        if self.groups.keys().any(|name| name.trim().is_empty()) {
            return Err(MetricsError::config("Group names cannot be empty"));
        }
        Ok(())
    }
}

impl MetricsConfig {
    /// Push this configuration into a registry.
    ///
    /// Each existing group receives its own override where one is configured
    /// and the global setting otherwise, in a single change. Groups the
    /// registry does not know are skipped.
    pub fn apply(&self, registry: &Registry, opts: LevelOpts) {
        info!(
            level = %self.global_level,
            mask = %self.global_mask,
            "Applying metrics configuration"
        );
        registry.set_defaults(self.global_level, self.global_mask);

        for group in registry.groups() {
            let settings = self.groups.get(group.name()).copied().unwrap_or_default();
            let level = settings.level.unwrap_or(self.global_level);
            let mask = settings.mask.unwrap_or(self.global_mask);
            group.set_group_policy(level, mask, opts);
            debug!("Applied configuration to group `{}`", group.name());
        }

        for name in self.groups.keys() {
            if registry.group(name).is_none() {
                warn!("Configured metrics group `{}` does not exist, skipping", name);
            }
        }
    }
}
