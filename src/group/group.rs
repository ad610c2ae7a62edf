//! Group implementation

use crate::backend::Backend;
use crate::metrics::{
    BasicKind, Cache, CacheOpts, CacheVec, CacheVecOpts, CircuitBreaker, CircuitBreakerOpts,
    CircuitBreakerVec, CircuitBreakerVecOpts, CompositeKind, Counter, CounterOpts, CounterVec,
    CounterVecOpts, Gauge, GaugeOpts, GaugeVec, GaugeVecOpts, Handle, Histogram, HistogramOpts,
    HistogramVec, HistogramVecOpts, Kind, Metric, MetricFactory, MetricKind, MetricOpts, Pool,
    PoolOpts, PoolVec, PoolVecOpts, Queue, QueueOpts, QueueVec, QueueVecOpts, Summary,
    SummaryOpts, SummaryVec, SummaryVecOpts, SwitchableMetric, Timer, TimerOpts, TimerVec,
    TimerVecOpts, Upgrade,
};
use crate::policy::{Context, Level, LevelOpts, Mask};
use crate::utils::qualify_name;
use parking_lot::RwLock;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A tracked metric, kept both type-erased (for policy changes) and as
/// `Any` (to hand the typed handle back on repeated requests)
struct Tracked {
    metric: Arc<dyn SwitchableMetric>,
    typed: Arc<dyn Any + Send + Sync>,
}

impl Tracked {
    fn new<T: ?Sized + Kind>(handle: &Handle<T>) -> Self {
        Self {
            metric: handle.clone(),
            typed: handle.clone(),
        }
    }
}

struct GroupState {
    level: Level,
    mask: Mask,
    basics: HashMap<String, Tracked>,
    composites: HashMap<String, Tracked>,
    /// Noop-backed metrics waiting for a policy that enables them
    noops: HashSet<String>,
}

impl GroupState {
    fn admits(&self, level: Level, mask: Mask) -> bool {
        level.enabled(self.level) && self.mask.has(mask)
    }

    fn get(&self, name: &str) -> Option<&Tracked> {
        self.basics.get(name).or_else(|| self.composites.get(name))
    }

    fn find<T: ?Sized + Kind>(&self, name: &str) -> Option<Handle<T>> {
        let tracked = self.get(name)?;
        match tracked.typed.clone().downcast() {
            Ok(handle) => Some(handle),
            Err(_) => panic!(
                "metric `{}` is already registered as a different kind than {}",
                name,
                std::any::type_name::<T>()
            ),
        }
    }

    fn track<T: ?Sized + Kind>(&mut self, handle: &Handle<T>) {
        let name = handle.name().to_string();
        if handle.is_noop() {
            self.noops.insert(name.clone());
        }
        let tracked = Tracked::new(handle);
        match handle.kind() {
            MetricKind::Basic => self.basics.insert(name, tracked),
            MetricKind::Composite => self.composites.insert(name, tracked),
        };
    }

    /// Upgrade every pending metric the current policy enables
    fn upgrade_pending(&mut self, group: &str, backend: &dyn Backend) -> usize {
        let candidates: Vec<String> = self
            .noops
            .iter()
            .filter(|name| {
                self.get(name)
                    .is_some_and(|t| self.admits(t.metric.level(), t.metric.mask()))
            })
            .cloned()
            .collect();

        let mut upgraded = 0;
        for name in candidates {
            let Some(tracked) = self.get(&name) else {
                continue;
            };
            match tracked.metric.upgrade(backend) {
                Ok(_) => {
                    self.noops.remove(&name);
                    upgraded += 1;
                }
                Err(e) => warn!(
                    group = group,
                    metric = %name,
                    error = %e,
                    "Failed to upgrade noop metric, leaving it pending"
                ),
            }
        }
        upgraded
    }
}

/// Named collection of metrics sharing one enablement policy.
///
/// Factory methods are idempotent by name: asking twice for the same name
/// returns the same handle, whatever options the second call passes.
pub struct Group {
    name: String,
    backend: Arc<dyn Backend>,
    state: RwLock<GroupState>,
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("level", &state.level)
            .field("mask", &state.mask)
            .field("metrics", &(state.basics.len() + state.composites.len()))
            .field("pending", &state.noops.len())
            .finish()
    }
}

impl Group {
    pub fn new(name: impl Into<String>, backend: Arc<dyn Backend>, level: Level, mask: Mask) -> Self {
        let name = name.into();
        debug!(group = %name, backend = backend.name(), %level, %mask, "Creating metric group");
        Self {
            name,
            backend,
            state: RwLock::new(GroupState {
                level,
                mask,
                basics: HashMap::new(),
                composites: HashMap::new(),
                noops: HashSet::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> Arc<dyn Backend> {
        self.backend.clone()
    }

    /// Minimum level currently recorded by this group
    pub fn level(&self) -> Level {
        self.state.read().level
    }

    pub fn mask(&self) -> Mask {
        self.state.read().mask
    }

    /// Context reflecting the group's current policy
    pub fn context(&self) -> Context {
        let state = self.state.read();
        Context::new(state.level, state.mask)
    }

    /// Change the group's minimum level.
    ///
    /// With [`LevelOpts::replace_noops`], pending metrics that the new level
    /// enables are rebuilt against the backend. Otherwise only the policy
    /// changes and existing metrics are gated at their next call.
    pub fn set_group_level(&self, level: Level, opts: LevelOpts) {
        let mut state = self.state.write();
        let previous = state.level;
        state.level = level;
        info!(group = %self.name, from = %previous, to = %level, "Group level changed");

        if opts.replace_noops && level != Level::Disabled {
            let upgraded = state.upgrade_pending(&self.name, &*self.backend);
            debug!(group = %self.name, upgraded, pending = state.noops.len(), "Upgraded noop metrics");
        }
    }

    /// Change the group's mask. Upgrades follow the same rules as
    /// [`set_group_level`](Self::set_group_level).
    pub fn set_group_mask(&self, mask: Mask, opts: LevelOpts) {
        let mut state = self.state.write();
        let previous = state.mask;
        state.mask = mask;
        info!(group = %self.name, from = %previous, to = %mask, "Group mask changed");

        if opts.replace_noops && state.level != Level::Disabled {
            let upgraded = state.upgrade_pending(&self.name, &*self.backend);
            debug!(group = %self.name, upgraded, pending = state.noops.len(), "Upgraded noop metrics");
        }
    }

    /// Change level and mask together.
    ///
    /// Pending metrics are upgraded at most once, against the combined
    /// policy, so an intermediate state never reaches the backend.
    pub fn set_group_policy(&self, level: Level, mask: Mask, opts: LevelOpts) {
        let mut state = self.state.write();
        let (from_level, from_mask) = (state.level, state.mask);
        state.level = level;
        state.mask = mask;
        info!(
            group = %self.name,
            from_level = %from_level,
            to_level = %level,
            from_mask = %from_mask,
            to_mask = %mask,
            "Group policy changed"
        );

        if opts.replace_noops && level != Level::Disabled {
            let upgraded = state.upgrade_pending(&self.name, &*self.backend);
            debug!(group = %self.name, upgraded, pending = state.noops.len(), "Upgraded noop metrics");
        }
    }

    /// Look up a tracked metric by its unqualified name
    pub fn metric(&self, name: &str) -> Option<Arc<dyn SwitchableMetric>> {
        let qualified = qualify_name(&self.name, name);
        self.state
            .read()
            .get(&qualified)
            .map(|tracked| tracked.metric.clone())
    }

    /// Qualified names of every tracked metric, sorted
    pub fn names(&self) -> Vec<String> {
        let state = self.state.read();
        let mut names: Vec<String> = state
            .basics
            .keys()
            .chain(state.composites.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Qualified names of metrics still backed by a noop, sorted
    pub fn pending_upgrades(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().noops.iter().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        let state = self.state.read();
        state.basics.len() + state.composites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the tracked basic metric named by `opts`, creating it if needed
    pub fn basic<T: ?Sized + BasicKind>(&self, mut opts: T::Opts, level: Level) -> Handle<T> {
        opts.qualify(&self.name);
        let mut state = self.state.write();
        if let Some(existing) = state.find::<T>(opts.name()) {
            return existing;
        }

        let enabled = state.admits(level, opts.info().mask);
        let handle = MetricFactory::new(&*self.backend, level, enabled).basic::<T>(opts);
        state.track(&handle);
        debug!(
            group = %self.name,
            metric = handle.name(),
            %level,
            noop = handle.is_noop(),
            "Created metric"
        );
        handle
    }

    /// Return the tracked composite named by `opts`, creating it if needed.
    /// Its components are not tracked on their own.
    pub fn composite<T: ?Sized + CompositeKind>(&self, mut opts: T::Opts, level: Level) -> Handle<T> {
        opts.qualify(&self.name);
        let mut state = self.state.write();
        if let Some(existing) = state.find::<T>(opts.name()) {
            return existing;
        }

        let enabled = state.admits(level, opts.info().mask);
        let handle = MetricFactory::new(&*self.backend, level, enabled).composite::<T>(opts);
        state.track(&handle);
        debug!(
            group = %self.name,
            metric = handle.name(),
            %level,
            noop = handle.is_noop(),
            "Created composite metric"
        );
        handle
    }

    pub fn counter(&self, opts: CounterOpts, level: Level) -> Handle<dyn Counter> {
        self.basic::<dyn Counter>(opts, level)
    }

    pub fn counter_vec(&self, opts: CounterVecOpts, level: Level) -> Handle<dyn CounterVec> {
        self.basic::<dyn CounterVec>(opts, level)
    }

    pub fn gauge(&self, opts: GaugeOpts, level: Level) -> Handle<dyn Gauge> {
        self.basic::<dyn Gauge>(opts, level)
    }

    pub fn gauge_vec(&self, opts: GaugeVecOpts, level: Level) -> Handle<dyn GaugeVec> {
        self.basic::<dyn GaugeVec>(opts, level)
    }

    pub fn histogram(&self, opts: HistogramOpts, level: Level) -> Handle<dyn Histogram> {
        self.basic::<dyn Histogram>(opts, level)
    }

    pub fn histogram_vec(&self, opts: HistogramVecOpts, level: Level) -> Handle<dyn HistogramVec> {
        self.basic::<dyn HistogramVec>(opts, level)
    }

    pub fn summary(&self, opts: SummaryOpts, level: Level) -> Handle<dyn Summary> {
        self.basic::<dyn Summary>(opts, level)
    }

    pub fn summary_vec(&self, opts: SummaryVecOpts, level: Level) -> Handle<dyn SummaryVec> {
        self.basic::<dyn SummaryVec>(opts, level)
    }

    pub fn timer(&self, opts: TimerOpts, level: Level) -> Handle<dyn Timer> {
        self.composite::<dyn Timer>(opts, level)
    }

    pub fn timer_vec(&self, opts: TimerVecOpts, level: Level) -> Handle<dyn TimerVec> {
        self.composite::<dyn TimerVec>(opts, level)
    }

    pub fn cache(&self, opts: CacheOpts, level: Level) -> Handle<dyn Cache> {
        self.composite::<dyn Cache>(opts, level)
    }

    pub fn cache_vec(&self, opts: CacheVecOpts, level: Level) -> Handle<dyn CacheVec> {
        self.composite::<dyn CacheVec>(opts, level)
    }

    pub fn pool(&self, opts: PoolOpts, level: Level) -> Handle<dyn Pool> {
        self.composite::<dyn Pool>(opts, level)
    }

    pub fn pool_vec(&self, opts: PoolVecOpts, level: Level) -> Handle<dyn PoolVec> {
        self.composite::<dyn PoolVec>(opts, level)
    }

    pub fn circuit_breaker(
        &self,
        opts: CircuitBreakerOpts,
        level: Level,
    ) -> Handle<dyn CircuitBreaker> {
        self.composite::<dyn CircuitBreaker>(opts, level)
    }

    pub fn circuit_breaker_vec(
        &self,
        opts: CircuitBreakerVecOpts,
        level: Level,
    ) -> Handle<dyn CircuitBreakerVec> {
        self.composite::<dyn CircuitBreakerVec>(opts, level)
    }

    pub fn queue(&self, opts: QueueOpts, level: Level) -> Handle<dyn Queue> {
        self.composite::<dyn Queue>(opts, level)
    }

    pub fn queue_vec(&self, opts: QueueVecOpts, level: Level) -> Handle<dyn QueueVec> {
        self.composite::<dyn QueueVec>(opts, level)
    }
}
