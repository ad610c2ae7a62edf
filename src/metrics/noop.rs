//! Zero-behaviour metrics
//!
//! A noop accepts every call and records nothing. It keeps the options and
//! level it was created with so it can later be rebuilt as a real metric.

use super::composite::{
    CacheParts, CacheVecParts, CircuitBreakerParts, CircuitBreakerVecParts, Parts, PoolParts,
    PoolVecParts, QueueParts, QueueVecParts, TimerParts, TimerVecParts,
};
use super::kinds::{
    Cache, CacheVec, CircuitBreaker, CircuitBreakerState, CircuitBreakerVec, Counter, CounterVec,
    Gauge, GaugeVec, Histogram, HistogramVec, Pool, PoolVec, Queue, QueueVec, Summary, SummaryVec,
    Timer, TimerGuard, TimerVec, TimerVecGuard,
};
use super::opts::{
    CounterOpts, CounterVecOpts, GaugeOpts, GaugeVecOpts, HistogramOpts, HistogramVecOpts,
    MetricOpts, SummaryOpts, SummaryVecOpts,
};
use super::{CompositeMetric, Metric, MetricInfo, MetricKind, SwitchableMetric};
use crate::backend::Labels;
use crate::policy::{AtomicLevel, Context, Level, Mask};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Noop basic metric holding its construction options
pub struct Noop<O> {
    opts: O,
    level: AtomicLevel,
}

impl<O: MetricOpts> Noop<O> {
    pub fn new(opts: O, level: Level) -> Self {
        Self {
            opts,
            level: AtomicLevel::new(level),
        }
    }

    pub fn opts(&self) -> &O {
        &self.opts
    }
}

impl<O: MetricOpts> Metric for Noop<O> {
    fn name(&self) -> &str {
        self.opts.name()
    }

    fn help(&self) -> &str {
        &self.opts.info().help
    }

    fn level(&self) -> Level {
        self.level.get()
    }

    fn mask(&self) -> Mask {
        self.opts.info().mask
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Basic
    }
}

/// Implements a kind trait on a noop type with every method returning a
/// fixed value
macro_rules! noop {
    ($target:ty => $kind:ident {
        $(fn $method:ident($($arg:ident: $ty:ty),*) -> $ret:ty = $value:expr;)+
    }) => {
        impl $kind for $target {
            $(
                fn $method(&self, $(_: $ty),*) -> $ret {
                    $value
                }
            )+
        }
    };
}

noop!(Noop<CounterOpts> => Counter {
    fn inc(ctx: &Context) -> Result<()> = Ok(());
    fn add(ctx: &Context, value: f64) -> Result<()> = Ok(());
});

noop!(Noop<CounterVecOpts> => CounterVec {
    fn inc(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn add(ctx: &Context, value: f64, labels: &Labels) -> Result<()> = Ok(());
});

noop!(Noop<GaugeOpts> => Gauge {
    fn set(ctx: &Context, value: f64) -> Result<()> = Ok(());
    fn inc(ctx: &Context) -> Result<()> = Ok(());
    fn dec(ctx: &Context) -> Result<()> = Ok(());
    fn add(ctx: &Context, value: f64) -> Result<()> = Ok(());
});

noop!(Noop<GaugeVecOpts> => GaugeVec {
    fn set(ctx: &Context, value: f64, labels: &Labels) -> Result<()> = Ok(());
    fn inc(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn dec(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn add(ctx: &Context, value: f64, labels: &Labels) -> Result<()> = Ok(());
});

noop!(Noop<HistogramOpts> => Histogram {
    fn observe(ctx: &Context, value: f64) -> Result<()> = Ok(());
});

noop!(Noop<HistogramVecOpts> => HistogramVec {
    fn observe(ctx: &Context, value: f64, labels: &Labels) -> Result<()> = Ok(());
});

noop!(Noop<SummaryOpts> => Summary {
    fn observe(ctx: &Context, value: f64) -> Result<()> = Ok(());
    fn quantile(ctx: &Context, q: f64) -> Result<f64> = Ok(0.0);
});

noop!(Noop<SummaryVecOpts> => SummaryVec {
    fn observe(ctx: &Context, value: f64, labels: &Labels) -> Result<()> = Ok(());
    fn quantile(ctx: &Context, q: f64, labels: &Labels) -> Result<f64> = Ok(0.0);
});

/// Noop composite. Its components are switchables too (normally noop-backed),
/// so upgrading the composite can reuse them in place.
pub struct NoopComposite<P> {
    info: MetricInfo,
    level: AtomicLevel,
    parts: P,
}

impl<P: Parts> NoopComposite<P> {
    pub fn new(info: MetricInfo, level: Level, parts: P) -> Self {
        Self {
            info,
            level: AtomicLevel::new(level),
            parts,
        }
    }

    pub fn info(&self) -> &MetricInfo {
        &self.info
    }

    pub fn parts(&self) -> &P {
        &self.parts
    }
}

impl<P: Parts> Metric for NoopComposite<P> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn help(&self) -> &str {
        &self.info.help
    }

    fn level(&self) -> Level {
        self.level.get()
    }

    fn mask(&self) -> Mask {
        self.info.mask
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
        for component in self.parts.components() {
            component.set_level(level);
        }
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Composite
    }
}

impl<P: Parts> CompositeMetric for NoopComposite<P> {
    fn components(&self) -> Vec<Arc<dyn SwitchableMetric>> {
        self.parts.components()
    }
}

impl Timer for NoopComposite<TimerParts> {
    fn record(&self, _: &Context, _: Duration) -> Result<()> {
        Ok(())
    }

    fn start(&self, ctx: &Context) -> TimerGuard<'_> {
        TimerGuard::inert(self, ctx)
    }
}

impl TimerVec for NoopComposite<TimerVecParts> {
    fn record(&self, _: &Context, _: Duration, _: &Labels) -> Result<()> {
        Ok(())
    }

    fn start(&self, ctx: &Context, labels: &Labels) -> TimerVecGuard<'_> {
        TimerVecGuard::inert(self, ctx, labels)
    }
}

noop!(NoopComposite<CacheParts> => Cache {
    fn hit(ctx: &Context) -> Result<()> = Ok(());
    fn miss(ctx: &Context) -> Result<()> = Ok(());
    fn set_size(ctx: &Context, bytes: i64) -> Result<()> = Ok(());
});

noop!(NoopComposite<CacheVecParts> => CacheVec {
    fn hit(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn miss(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn set_size(ctx: &Context, bytes: i64, labels: &Labels) -> Result<()> = Ok(());
});

noop!(NoopComposite<PoolParts> => Pool {
    fn set_active(ctx: &Context, count: usize) -> Result<()> = Ok(());
    fn set_idle(ctx: &Context, count: usize) -> Result<()> = Ok(());
    fn acquired(ctx: &Context) -> Result<()> = Ok(());
    fn released(ctx: &Context) -> Result<()> = Ok(());
});

noop!(NoopComposite<PoolVecParts> => PoolVec {
    fn set_active(ctx: &Context, count: usize, labels: &Labels) -> Result<()> = Ok(());
    fn set_idle(ctx: &Context, count: usize, labels: &Labels) -> Result<()> = Ok(());
    fn acquired(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn released(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
});

noop!(NoopComposite<CircuitBreakerParts> => CircuitBreaker {
    fn set_state(ctx: &Context, state: CircuitBreakerState) -> Result<()> = Ok(());
    fn success(ctx: &Context) -> Result<()> = Ok(());
    fn failure(ctx: &Context) -> Result<()> = Ok(());
});

noop!(NoopComposite<CircuitBreakerVecParts> => CircuitBreakerVec {
    fn set_state(ctx: &Context, state: CircuitBreakerState, labels: &Labels) -> Result<()> = Ok(());
    fn success(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn failure(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
});

noop!(NoopComposite<QueueParts> => Queue {
    fn set_depth(ctx: &Context, depth: usize) -> Result<()> = Ok(());
    fn enqueued(ctx: &Context) -> Result<()> = Ok(());
    fn dequeued(ctx: &Context) -> Result<()> = Ok(());
    fn set_wait_time(ctx: &Context, wait: Duration) -> Result<()> = Ok(());
});

noop!(NoopComposite<QueueVecParts> => QueueVec {
    fn set_depth(ctx: &Context, depth: usize, labels: &Labels) -> Result<()> = Ok(());
    fn enqueued(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn dequeued(ctx: &Context, labels: &Labels) -> Result<()> = Ok(());
    fn set_wait_time(ctx: &Context, wait: Duration, labels: &Labels) -> Result<()> = Ok(());
});
