//! Configuration loading utilities
//!
//! Files are JSON unless their extension says YAML. Environment variables
//! override the defaults:
//!
//! - `METRICS_LEVEL`, `METRICS_MASK`, `METRICS_BACKEND`
//! - `METRICS_GROUP_<NAME>_LEVEL`, `METRICS_GROUP_<NAME>_MASK`

use super::models::*;
use crate::policy::{Level, Mask};
use crate::utils::error::Result;
use std::env;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub const ENV_LEVEL: &str = "METRICS_LEVEL";
pub const ENV_MASK: &str = "METRICS_MASK";
pub const ENV_BACKEND: &str = "METRICS_BACKEND";
pub const ENV_GROUP_PREFIX: &str = "METRICS_GROUP_";

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

impl MetricsConfig {
    /// Load configuration from a JSON or YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading metrics configuration from: {:?}", path);

        let content = fs::read_to_string(path)?;
        let config: Self = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        debug!(groups = config.groups.len(), "Metrics configuration loaded");
        Ok(config)
    }

    /// Write the configuration in the format its extension names
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            self.to_yaml()?
        } else {
            self.to_json()?
        };
        fs::write(path, content)?;
        debug!("Metrics configuration written to: {:?}", path);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Self {
        debug!("Loading metrics configuration from environment variables");
        Self::from_vars(env::vars())
    }

    /// Load configuration from `(key, value)` pairs shaped like environment
    /// variables. Unrelated keys are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            if value.is_empty() {
                continue;
            }

            match key {
                ENV_LEVEL => config.global_level = Level::parse(value),
                ENV_MASK => config.global_mask = Mask::parse(value),
                ENV_BACKEND => config.backend.kind = value.to_string(),
                _ => {
                    if let Some(rest) = key.strip_prefix(ENV_GROUP_PREFIX) {
                        apply_group_var(&mut config, rest, value);
                    }
                }
            }
        }

        config
    }
}

/// Apply `<NAME>_<SETTING>=value`; the group name may itself contain underscores
fn apply_group_var(config: &mut MetricsConfig, rest: &str, value: &str) {
    let Some((name, setting)) = rest.rsplit_once('_') else {
        warn!("Ignoring malformed group variable: {}{}", ENV_GROUP_PREFIX, rest);
        return;
    };
    if name.is_empty() {
        warn!("Ignoring group variable without a group name: {}{}", ENV_GROUP_PREFIX, rest);
        return;
    }

    let group = config.groups.entry(name.to_lowercase()).or_default();
    match setting.to_ascii_lowercase().as_str() {
        "level" => group.level = Some(Level::parse(value)),
        "mask" => group.mask = Some(Mask::parse(value)),
        other => warn!("Unknown group setting `{}` for group `{}`", other, name),
    }
}

/// Merge configuration from multiple sources, later ones winning
pub fn merge_configs(base: MetricsConfig, overrides: Vec<MetricsConfig>) -> MetricsConfig {
    overrides.into_iter().fold(base, |acc, config| acc.merge(config))
}

/// Load configuration with precedence: defaults, then file, then environment
pub fn load_config_with_precedence(
    config_file: Option<&Path>,
    env_override: bool,
) -> Result<MetricsConfig> {
    let mut configs = Vec::new();

    if let Some(path) = config_file {
        configs.push(MetricsConfig::from_file(path)?);
    }
    if env_override {
        configs.push(MetricsConfig::from_env());
    }

    Ok(merge_configs(MetricsConfig::default(), configs))
}
