//! Configuration data models

use crate::backend::{Backend, MemoryBackend, NullBackend};
use crate::policy::{Level, Mask};
use crate::utils::error::{MetricsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Default global level
pub fn default_level() -> Level {
    Level::Important
}

/// Default global mask
pub fn default_mask() -> Mask {
    Mask::PRODUCTION
}

/// Default backend kind
pub fn default_backend_kind() -> String {
    NullBackend::NAME.to_string()
}

/// Metrics configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Level applied to the registry and every group
    #[serde(default = "default_level")]
    pub global_level: Level,
    /// Mask applied to the registry and every group
    #[serde(default = "default_mask")]
    pub global_mask: Mask,
    /// Per-group overrides, keyed by group name
    #[serde(default)]
    pub groups: HashMap<String, GroupConfig>,
    /// Backend selection
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            global_level: default_level(),
            global_mask: default_mask(),
            groups: HashMap::new(),
            backend: BackendConfig::default(),
        }
    }
}

impl MetricsConfig {
    /// Production preset: no group more verbose than `Important`
    pub fn production(backend: &dyn Backend) -> Self {
        Self::default().into_production(backend)
    }

    /// Development preset: everything on
    pub fn development(backend: &dyn Backend) -> Self {
        Self::default().into_development(backend)
    }

    /// Cap an existing configuration for production
    pub fn into_production(mut self, backend: &dyn Backend) -> Self {
        self.global_level = Level::Important;
        self.global_mask = Mask::PRODUCTION;
        for group in self.groups.values_mut() {
            if group.level.is_some_and(|level| level > Level::Important) {
                group.level = Some(Level::Important);
            }
        }
        self.backend.kind = backend.name().to_string();
        self
    }

    /// Open up an existing configuration for development
    pub fn into_development(mut self, backend: &dyn Backend) -> Self {
        self.global_level = Level::Verbose;
        self.global_mask = Mask::ALL;
        for group in self.groups.values_mut() {
            group.level = Some(Level::Verbose);
            group.mask = Some(Mask::ALL);
        }
        self.backend.kind = backend.name().to_string();
        self
    }

    /// Add or replace the settings for one group
    pub fn with_group(mut self, name: impl Into<String>, group: GroupConfig) -> Self {
        self.groups.insert(name.into(), group);
        self
    }

    /// Merge configurations, letting non-default values in `other` win
    pub fn merge(mut self, other: Self) -> Self {
        if other.global_level != default_level() {
            self.global_level = other.global_level;
        }
        if other.global_mask != default_mask() {
            self.global_mask = other.global_mask;
        }
        for (name, group) in other.groups {
            let merged = match self.groups.remove(&name) {
                Some(existing) => existing.merge(group),
                None => group,
            };
            self.groups.insert(name, merged);
        }
        self.backend = self.backend.merge(other.backend);
        self
    }
}

/// Settings for a single group; unset fields leave the group alone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
}

impl GroupConfig {
    pub fn new(level: Level, mask: Mask) -> Self {
        Self {
            level: Some(level),
            mask: Some(mask),
        }
    }

    pub fn level(level: Level) -> Self {
        Self {
            level: Some(level),
            mask: None,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            level: other.level.or(self.level),
            mask: other.mask.or(self.mask),
        }
    }
}

/// Backend selection and backend-specific options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend name: `none`, `memory` or `prometheus`
    #[serde(rename = "type", default = "default_backend_kind")]
    pub kind: String,
    /// Free-form options passed through to the backend
    #[serde(rename = "config", default)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_backend_kind(),
            options: serde_json::Map::new(),
        }
    }
}

impl BackendConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.kind != default_backend_kind() {
            self.kind = other.kind;
        }
        self.options.extend(other.options);
        self
    }

    /// Instantiate the configured backend
    pub fn create(&self) -> Result<Arc<dyn Backend>> {
        match self.kind.to_ascii_lowercase().as_str() {
            "" | NullBackend::NAME => Ok(Arc::new(NullBackend)),
            MemoryBackend::NAME => Ok(Arc::new(MemoryBackend::new())),
            #[cfg(feature = "prometheus")]
            crate::backend::PrometheusBackend::NAME => {
                Ok(Arc::new(crate::backend::PrometheusBackend::new()))
            }
            other => Err(MetricsError::config(format!(
                "Unknown metrics backend: {}",
                other
            ))),
        }
    }
}
