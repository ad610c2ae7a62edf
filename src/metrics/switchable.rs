//! Identity-stable metric handles
//!
//! Callers keep an `Arc<Switchable<dyn Kind>>` for the lifetime of the
//! process. The group may swap the implementation behind it (noop to real)
//! at any time; the handle itself never changes.

use super::basic::Gated;
use super::composite::{
    CacheParts, CacheVecParts, CircuitBreakerParts, CircuitBreakerVecParts, Composite, Parts,
    PoolParts, PoolVecParts, QueueParts, QueueVecParts, TimerParts, TimerVecParts,
};
use super::kinds::{
    Cache, CacheVec, CircuitBreaker, CircuitBreakerState, CircuitBreakerVec, Counter, CounterVec,
    Gauge, GaugeVec, Histogram, HistogramVec, Pool, PoolVec, Queue, QueueVec, Summary, SummaryVec,
    Timer, TimerGuard, TimerVec, TimerVecGuard,
};
use super::noop::{Noop, NoopComposite};
use super::opts::{
    CacheOpts, CacheVecOpts, CircuitBreakerOpts, CircuitBreakerVecOpts, CounterOpts,
    CounterVecOpts, GaugeOpts, GaugeVecOpts, HistogramOpts, HistogramVecOpts, MetricInfo,
    MetricOpts, PoolOpts, PoolVecOpts, QueueOpts, QueueVecOpts, SummaryOpts, SummaryVecOpts,
    TimerOpts, TimerVecOpts,
};
use super::{CompositeMetric, Handle, Metric, MetricKind, SwitchableMetric};
use crate::backend::{
    Backend, CounterAdapter, CounterVecAdapter, GaugeAdapter, GaugeVecAdapter, HistogramAdapter,
    HistogramVecAdapter, Labels, SummaryAdapter, SummaryVecAdapter,
};
use crate::policy::{Context, Level, Mask};
use crate::utils::error::Result;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub(crate) mod sealed {
    use crate::backend::Backend;
    use crate::utils::error::Result;

    pub trait Upgrade {
        /// Replace a noop implementation with one built by `backend`.
        ///
        /// Returns `Ok(false)` when the metric was already real.
        fn upgrade(&self, backend: &dyn Backend) -> Result<bool>;
    }
}

use sealed::Upgrade;

/// A metric contract (`dyn Counter`, `dyn Cache`, ...) that can sit behind a
/// [`Switchable`]
pub trait Kind: Metric + 'static {
    /// The noop implementation, which keeps what is needed to build a real one
    type Noop: Metric + 'static;

    fn erase(noop: Arc<Self::Noop>) -> Arc<Self>;

    /// Build the real implementation equivalent to `noop`
    fn promote(noop: &Self::Noop, backend: &dyn Backend) -> Result<Arc<Self>>;
}

/// A kind recorded directly by a backend adapter
pub trait BasicKind: Kind {
    type Opts: MetricOpts;

    fn noop(opts: Self::Opts, level: Level) -> Self::Noop;

    fn build(opts: &Self::Opts, level: Level, backend: &dyn Backend) -> Result<Arc<Self>>;
}

/// A kind assembled from basic components
pub trait CompositeKind: Kind + CompositeMetric {
    type Opts: MetricOpts;
    type Parts: Parts;

    fn parts(opts: &Self::Opts, factory: &MetricFactory<'_>) -> Self::Parts;

    fn assemble(info: MetricInfo, level: Level, parts: Self::Parts) -> Arc<Self>;

    fn noop(info: MetricInfo, level: Level, parts: Self::Parts) -> Self::Noop;
}

struct Slot<T: ?Sized + Kind> {
    current: Arc<T>,
    /// Set while `current` is the noop
    noop: Option<Arc<T::Noop>>,
}

/// Identity-preserving cell around a metric implementation.
///
/// Every call takes a read lock and delegates to the current implementation;
/// replacing the implementation takes the write lock.
pub struct Switchable<T: ?Sized + Kind> {
    info: MetricInfo,
    kind: MetricKind,
    slot: RwLock<Slot<T>>,
}

impl<T: ?Sized + Kind> Switchable<T> {
    pub fn new(current: Arc<T>) -> Self {
        Self {
            info: info_of(&*current),
            kind: current.kind(),
            slot: RwLock::new(Slot {
                current,
                noop: None,
            }),
        }
    }

    pub fn from_noop(noop: Arc<T::Noop>) -> Self {
        let current = T::erase(noop.clone());
        Self {
            info: info_of(&*current),
            kind: current.kind(),
            slot: RwLock::new(Slot {
                current,
                noop: Some(noop),
            }),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.slot.read().noop.is_some()
    }

    /// The implementation calls are currently delegated to
    pub fn current(&self) -> Arc<T> {
        self.slot.read().current.clone()
    }

    /// Replace the backing implementation. Calls already in flight finish on
    /// the previous one.
    pub fn switch_impl(&self, implementation: Arc<T>) {
        let mut slot = self.slot.write();
        slot.current = implementation;
        slot.noop = None;
    }
}

fn info_of<T: ?Sized + Metric>(metric: &T) -> MetricInfo {
    MetricInfo {
        name: metric.name().to_string(),
        help: metric.help().to_string(),
        mask: metric.mask(),
    }
}

impl<T: ?Sized + Kind> Metric for Switchable<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn help(&self) -> &str {
        &self.info.help
    }

    fn level(&self) -> Level {
        self.slot.read().current.level()
    }

    fn mask(&self) -> Mask {
        self.info.mask
    }

    fn set_level(&self, level: Level) {
        self.slot.read().current.set_level(level);
    }

    fn kind(&self) -> MetricKind {
        self.kind
    }
}

impl<T: ?Sized + Kind + CompositeMetric> CompositeMetric for Switchable<T> {
    fn components(&self) -> Vec<Arc<dyn SwitchableMetric>> {
        self.slot.read().current.components()
    }
}

impl<T: ?Sized + Kind> Upgrade for Switchable<T> {
    fn upgrade(&self, backend: &dyn Backend) -> Result<bool> {
        let noop = self.slot.read().noop.clone();
        let Some(noop) = noop else {
            return Ok(false);
        };

        // Build outside the lock so callers keep recording into the noop
        let real = T::promote(&noop, backend)?;

        let mut slot = self.slot.write();
        if slot.noop.is_none() {
            return Ok(false);
        }
        // Carry over a level set while the backend metric was being built
        real.set_level(slot.current.level());
        slot.current = real;
        slot.noop = None;
        debug!(
            metric = %self.info.name,
            backend = backend.name(),
            "Replaced noop metric with backend implementation"
        );
        Ok(true)
    }
}

impl<T: ?Sized + Kind> SwitchableMetric for Switchable<T> {
    fn is_noop(&self) -> bool {
        Switchable::is_noop(self)
    }
}

/// Creates switchable metrics under a single enablement decision
pub struct MetricFactory<'a> {
    backend: &'a dyn Backend,
    level: Level,
    enabled: bool,
}

impl<'a> MetricFactory<'a> {
    pub(crate) fn new(backend: &'a dyn Backend, level: Level, enabled: bool) -> Self {
        Self {
            backend,
            level,
            enabled,
        }
    }

    /// Build a basic metric, falling back to a noop when disabled or when the
    /// backend refuses it
    pub fn basic<T: ?Sized + BasicKind>(&self, opts: T::Opts) -> Handle<T> {
        if self.enabled {
            match T::build(&opts, self.level, self.backend) {
                Ok(real) => return Arc::new(Switchable::new(real)),
                Err(e) => warn!(
                    metric = opts.name(),
                    backend = self.backend.name(),
                    error = %e,
                    "Backend failed to construct metric, falling back to noop"
                ),
            }
        }
        Arc::new(Switchable::from_noop(Arc::new(T::noop(opts, self.level))))
    }

    /// Build a composite. It is only real when enabled and every component
    /// came out real.
    pub fn composite<T: ?Sized + CompositeKind>(&self, opts: T::Opts) -> Handle<T> {
        let parts = T::parts(&opts, self);
        let info = opts.info().clone();
        let complete = parts.components().iter().all(|c| !c.is_noop());

        if self.enabled && complete {
            Arc::new(Switchable::new(T::assemble(info, self.level, parts)))
        } else {
            Arc::new(Switchable::from_noop(Arc::new(T::noop(
                info, self.level, parts,
            ))))
        }
    }
}

macro_rules! basic_kind {
    ($($kind:ident: $opts:ty => $adapter:ident, $ctor:ident;)+) => {
        $(
            impl Kind for dyn $kind {
                type Noop = Noop<$opts>;

                fn erase(noop: Arc<Noop<$opts>>) -> Arc<Self> {
                    noop
                }

                fn promote(noop: &Noop<$opts>, backend: &dyn Backend) -> Result<Arc<Self>> {
                    <Self as BasicKind>::build(noop.opts(), noop.level(), backend)
                }
            }

            impl BasicKind for dyn $kind {
                type Opts = $opts;

                fn noop(opts: $opts, level: Level) -> Noop<$opts> {
                    Noop::new(opts, level)
                }

                fn build(opts: &$opts, level: Level, backend: &dyn Backend) -> Result<Arc<Self>> {
                    let adapter = backend.$ctor(opts)?;
                    Ok(Arc::new(Gated::<dyn $adapter>::new(
                        opts.info.clone(),
                        level,
                        adapter,
                    )))
                }
            }
        )+
    };
}

basic_kind! {
    Counter: CounterOpts => CounterAdapter, counter;
    CounterVec: CounterVecOpts => CounterVecAdapter, counter_vec;
    Gauge: GaugeOpts => GaugeAdapter, gauge;
    GaugeVec: GaugeVecOpts => GaugeVecAdapter, gauge_vec;
    Histogram: HistogramOpts => HistogramAdapter, histogram;
    HistogramVec: HistogramVecOpts => HistogramVecAdapter, histogram_vec;
    Summary: SummaryOpts => SummaryAdapter, summary;
    SummaryVec: SummaryVecOpts => SummaryVecAdapter, summary_vec;
}

macro_rules! composite_kind {
    ($($kind:ident: $opts:ty => $parts:ident { $($field:ident: $part:ident),+ };)+) => {
        $(
            impl Kind for dyn $kind {
                type Noop = NoopComposite<$parts>;

                fn erase(noop: Arc<NoopComposite<$parts>>) -> Arc<Self> {
                    noop
                }

                fn promote(
                    noop: &NoopComposite<$parts>,
                    backend: &dyn Backend,
                ) -> Result<Arc<Self>> {
                    // Components are upgraded in place so handles obtained
                    // through `components()` stay valid
                    for component in noop.parts().components() {
                        component.upgrade(backend)?;
                    }
                    Ok(<Self as CompositeKind>::assemble(
                        noop.info().clone(),
                        noop.level(),
                        noop.parts().clone(),
                    ))
                }
            }

            impl CompositeKind for dyn $kind {
                type Opts = $opts;
                type Parts = $parts;

                fn parts(opts: &$opts, factory: &MetricFactory<'_>) -> $parts {
                    $parts {
                        $($field: factory.basic::<dyn $part>(opts.$field.clone()),)+
                    }
                }

                fn assemble(info: MetricInfo, level: Level, parts: $parts) -> Arc<Self> {
                    Arc::new(Composite::new(info, level, parts))
                }

                fn noop(info: MetricInfo, level: Level, parts: $parts) -> NoopComposite<$parts> {
                    NoopComposite::new(info, level, parts)
                }
            }
        )+
    };
}

composite_kind! {
    Timer: TimerOpts => TimerParts { histogram: Histogram };
    TimerVec: TimerVecOpts => TimerVecParts { histogram: HistogramVec };
    Cache: CacheOpts => CacheParts { hits: Counter, misses: Counter, size: Gauge };
    CacheVec: CacheVecOpts => CacheVecParts {
        hits: CounterVec,
        misses: CounterVec,
        size: GaugeVec
    };
    Pool: PoolOpts => PoolParts {
        active: Gauge,
        idle: Gauge,
        acquired: Counter,
        released: Counter
    };
    PoolVec: PoolVecOpts => PoolVecParts {
        active: GaugeVec,
        idle: GaugeVec,
        acquired: CounterVec,
        released: CounterVec
    };
    CircuitBreaker: CircuitBreakerOpts => CircuitBreakerParts {
        state: Gauge,
        successes: Counter,
        failures: Counter
    };
    CircuitBreakerVec: CircuitBreakerVecOpts => CircuitBreakerVecParts {
        state: GaugeVec,
        successes: CounterVec,
        failures: CounterVec
    };
    Queue: QueueOpts => QueueParts {
        depth: Gauge,
        enqueued: Counter,
        dequeued: Counter,
        wait_time: Histogram
    };
    QueueVec: QueueVecOpts => QueueVecParts {
        depth: GaugeVec,
        enqueued: CounterVec,
        dequeued: CounterVec,
        wait_time: HistogramVec
    };
}

/// Forwards a kind's operations to the current implementation under the
/// read lock
macro_rules! delegate {
    ($kind:ident { $(fn $method:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)+ }) => {
        impl $kind for Switchable<dyn $kind> {
            $(
                fn $method(&self, $($arg: $ty),*) -> $ret {
                    self.slot.read().current.$method($($arg),*)
                }
            )+
        }
    };
}

delegate!(Counter {
    fn inc(ctx: &Context) -> Result<()>;
    fn add(ctx: &Context, value: f64) -> Result<()>;
});

delegate!(CounterVec {
    fn inc(ctx: &Context, labels: &Labels) -> Result<()>;
    fn add(ctx: &Context, value: f64, labels: &Labels) -> Result<()>;
});

delegate!(Gauge {
    fn set(ctx: &Context, value: f64) -> Result<()>;
    fn inc(ctx: &Context) -> Result<()>;
    fn dec(ctx: &Context) -> Result<()>;
    fn add(ctx: &Context, value: f64) -> Result<()>;
});

delegate!(GaugeVec {
    fn set(ctx: &Context, value: f64, labels: &Labels) -> Result<()>;
    fn inc(ctx: &Context, labels: &Labels) -> Result<()>;
    fn dec(ctx: &Context, labels: &Labels) -> Result<()>;
    fn add(ctx: &Context, value: f64, labels: &Labels) -> Result<()>;
});

delegate!(Histogram {
    fn observe(ctx: &Context, value: f64) -> Result<()>;
});

delegate!(HistogramVec {
    fn observe(ctx: &Context, value: f64, labels: &Labels) -> Result<()>;
});

delegate!(Summary {
    fn observe(ctx: &Context, value: f64) -> Result<()>;
    fn quantile(ctx: &Context, q: f64) -> Result<f64>;
});

delegate!(SummaryVec {
    fn observe(ctx: &Context, value: f64, labels: &Labels) -> Result<()>;
    fn quantile(ctx: &Context, q: f64, labels: &Labels) -> Result<f64>;
});

delegate!(Cache {
    fn hit(ctx: &Context) -> Result<()>;
    fn miss(ctx: &Context) -> Result<()>;
    fn set_size(ctx: &Context, bytes: i64) -> Result<()>;
});

delegate!(CacheVec {
    fn hit(ctx: &Context, labels: &Labels) -> Result<()>;
    fn miss(ctx: &Context, labels: &Labels) -> Result<()>;
    fn set_size(ctx: &Context, bytes: i64, labels: &Labels) -> Result<()>;
});

delegate!(Pool {
    fn set_active(ctx: &Context, count: usize) -> Result<()>;
    fn set_idle(ctx: &Context, count: usize) -> Result<()>;
    fn acquired(ctx: &Context) -> Result<()>;
    fn released(ctx: &Context) -> Result<()>;
});

delegate!(PoolVec {
    fn set_active(ctx: &Context, count: usize, labels: &Labels) -> Result<()>;
    fn set_idle(ctx: &Context, count: usize, labels: &Labels) -> Result<()>;
    fn acquired(ctx: &Context, labels: &Labels) -> Result<()>;
    fn released(ctx: &Context, labels: &Labels) -> Result<()>;
});

delegate!(CircuitBreaker {
    fn set_state(ctx: &Context, state: CircuitBreakerState) -> Result<()>;
    fn success(ctx: &Context) -> Result<()>;
    fn failure(ctx: &Context) -> Result<()>;
});

delegate!(CircuitBreakerVec {
    fn set_state(ctx: &Context, state: CircuitBreakerState, labels: &Labels) -> Result<()>;
    fn success(ctx: &Context, labels: &Labels) -> Result<()>;
    fn failure(ctx: &Context, labels: &Labels) -> Result<()>;
});

delegate!(Queue {
    fn set_depth(ctx: &Context, depth: usize) -> Result<()>;
    fn enqueued(ctx: &Context) -> Result<()>;
    fn dequeued(ctx: &Context) -> Result<()>;
    fn set_wait_time(ctx: &Context, wait: Duration) -> Result<()>;
});

delegate!(QueueVec {
    fn set_depth(ctx: &Context, depth: usize, labels: &Labels) -> Result<()>;
    fn enqueued(ctx: &Context, labels: &Labels) -> Result<()>;
    fn dequeued(ctx: &Context, labels: &Labels) -> Result<()>;
    fn set_wait_time(ctx: &Context, wait: Duration, labels: &Labels) -> Result<()>;
});

// Guards hold the switchable itself so the recording goes to whatever
// implementation is current when the guard stops.
impl Timer for Switchable<dyn Timer> {
    fn record(&self, ctx: &Context, elapsed: Duration) -> Result<()> {
        self.slot.read().current.record(ctx, elapsed)
    }

    fn start(&self, ctx: &Context) -> TimerGuard<'_> {
        TimerGuard::new(self, ctx)
    }
}

impl TimerVec for Switchable<dyn TimerVec> {
    fn record(&self, ctx: &Context, elapsed: Duration, labels: &Labels) -> Result<()> {
        self.slot.read().current.record(ctx, elapsed, labels)
    }

    fn start(&self, ctx: &Context, labels: &Labels) -> TimerVecGuard<'_> {
        TimerVecGuard::new(self, ctx, labels)
    }
}
