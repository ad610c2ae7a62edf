//! Registry implementation

use crate::backend::Backend;
use crate::config::MetricsConfig;
use crate::group::Group;
use crate::policy::{Context, Level, LevelOpts, Mask};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

struct RegistryState {
    groups: HashMap<String, Arc<Group>>,
    global_level: Level,
    global_mask: Mask,
}

/// Owner of every [`Group`] and of the default policy new groups start with.
///
/// There is no process-global instance; create one at startup and pass it
/// (or an `Arc` of it) to whatever needs metrics.
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Registry")
            .field("global_level", &state.global_level)
            .field("global_mask", &state.global_mask)
            .field("groups", &state.groups.len())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Level::Important)
    }
}

impl Registry {
    /// Registry with the given default level and the production mask
    pub fn new(level: Level) -> Self {
        Self::with_policy(level, Mask::PRODUCTION)
    }

    /// Registry seeded with a configuration's global policy
    pub fn from_config(config: &MetricsConfig) -> Self {
        Self::with_policy(config.global_level, config.global_mask)
    }

    pub fn with_policy(level: Level, mask: Mask) -> Self {
        debug!(%level, %mask, "Creating metrics registry");
        Self {
            state: RwLock::new(RegistryState {
                groups: HashMap::new(),
                global_level: level,
                global_mask: mask,
            }),
        }
    }

    /// Return the group called `name`, creating it if needed.
    ///
    /// An existing group is returned as-is: `backend` and `levels` are ignored
    /// on a name collision. A new group starts at the lowest of `levels`, or
    /// at the global level when none are given, and with the global mask.
    pub fn new_group(
        &self,
        name: &str,
        backend: Arc<dyn Backend>,
        levels: &[Level],
    ) -> Arc<Group> {
        let mut state = self.state.write();
        if let Some(group) = state.groups.get(name) {
            return group.clone();
        }

        let level = levels.iter().copied().min().unwrap_or(state.global_level);
        let group = Arc::new(Group::new(name, backend, level, state.global_mask));
        state.groups.insert(name.to_string(), group.clone());
        group
    }

    pub fn group(&self, name: &str) -> Option<Arc<Group>> {
        self.state.read().groups.get(name).cloned()
    }

    pub fn groups(&self) -> Vec<Arc<Group>> {
        self.state.read().groups.values().cloned().collect()
    }

    /// Names of every group, sorted
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().groups.keys().cloned().collect();
        names.sort();
        names
    }

    /// Set the default level and apply it to every existing group
    pub fn set_global_level(&self, level: Level, opts: LevelOpts) {
        let mut state = self.state.write();
        state.global_level = level;
        info!(%level, groups = state.groups.len(), "Global metrics level changed");
        for group in state.groups.values() {
            group.set_group_level(level, opts);
        }
    }

    /// Set the default mask and apply it to every existing group
    pub fn set_global_mask(&self, mask: Mask, opts: LevelOpts) {
        let mut state = self.state.write();
        state.global_mask = mask;
        info!(%mask, groups = state.groups.len(), "Global metrics mask changed");
        for group in state.groups.values() {
            group.set_group_mask(mask, opts);
        }
    }

    /// Replace the default policy without touching existing groups
    pub(crate) fn set_defaults(&self, level: Level, mask: Mask) {
        let mut state = self.state.write();
        state.global_level = level;
        state.global_mask = mask;
        info!(%level, %mask, "Global metrics policy changed");
    }

    pub fn global_level(&self) -> Level {
        self.state.read().global_level
    }

    pub fn global_mask(&self) -> Mask {
        self.state.read().global_mask
    }

    /// Context at the registry's default policy
    pub fn global_context(&self) -> Context {
        let state = self.state.read();
        Context::new(state.global_level, state.global_mask)
    }
}
