//! Composite metrics built on switchable components
//!
//! A composite does no gating of its own: each operation forwards to the
//! relevant component, which applies its own level and mask checks.

use super::kinds::{
    Cache, CacheVec, CircuitBreaker, CircuitBreakerState, CircuitBreakerVec, Counter, CounterVec,
    Gauge, GaugeVec, Histogram, HistogramVec, Pool, PoolVec, Queue, QueueVec, Timer, TimerGuard,
    TimerVec, TimerVecGuard,
};
use super::{CompositeMetric, Handle, Metric, MetricInfo, MetricKind, SwitchableMetric};
use crate::backend::Labels;
use crate::policy::{AtomicLevel, Context, Level, Mask};
use crate::utils::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// The set of component handles a composite forwards to
pub trait Parts: Clone + Send + Sync + 'static {
    fn components(&self) -> Vec<Arc<dyn SwitchableMetric>>;
}

macro_rules! parts {
    ($(#[$meta:meta])* $parts:ident { $($field:ident: $kind:ty),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $parts {
            $(pub $field: Handle<$kind>,)+
        }

        impl Parts for $parts {
            fn components(&self) -> Vec<Arc<dyn SwitchableMetric>> {
                vec![$(self.$field.clone() as Arc<dyn SwitchableMetric>),+]
            }
        }
    };
}

parts!(
    /// Components of a [`Timer`]
    TimerParts { histogram: dyn Histogram }
);
parts!(TimerVecParts { histogram: dyn HistogramVec });
parts!(
    /// Components of a [`Cache`]
    CacheParts { hits: dyn Counter, misses: dyn Counter, size: dyn Gauge }
);
parts!(CacheVecParts { hits: dyn CounterVec, misses: dyn CounterVec, size: dyn GaugeVec });
parts!(
    /// Components of a [`Pool`]
    PoolParts {
        active: dyn Gauge,
        idle: dyn Gauge,
        acquired: dyn Counter,
        released: dyn Counter,
    }
);
parts!(PoolVecParts {
    active: dyn GaugeVec,
    idle: dyn GaugeVec,
    acquired: dyn CounterVec,
    released: dyn CounterVec,
});
parts!(
    /// Components of a [`CircuitBreaker`]
    CircuitBreakerParts { state: dyn Gauge, successes: dyn Counter, failures: dyn Counter }
);
parts!(CircuitBreakerVecParts {
    state: dyn GaugeVec,
    successes: dyn CounterVec,
    failures: dyn CounterVec,
});
parts!(
    /// Components of a [`Queue`]
    QueueParts {
        depth: dyn Gauge,
        enqueued: dyn Counter,
        dequeued: dyn Counter,
        wait_time: dyn Histogram,
    }
);
parts!(QueueVecParts {
    depth: dyn GaugeVec,
    enqueued: dyn CounterVec,
    dequeued: dyn CounterVec,
    wait_time: dyn HistogramVec,
});

/// A real composite metric over a set of parts
pub struct Composite<P> {
    info: MetricInfo,
    level: AtomicLevel,
    parts: P,
}

impl<P: Parts> Composite<P> {
    pub fn new(info: MetricInfo, level: Level, parts: P) -> Self {
        Self {
            info,
            level: AtomicLevel::new(level),
            parts,
        }
    }

    pub fn parts(&self) -> &P {
        &self.parts
    }
}

impl<P: Parts> Metric for Composite<P> {
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

impl<P: Parts> CompositeMetric for Composite<P> {
    fn components(&self) -> Vec<Arc<dyn SwitchableMetric>> {
        self.parts.components()
    }
}

impl Timer for Composite<TimerParts> {
    fn record(&self, ctx: &Context, elapsed: Duration) -> Result<()> {
        self.parts.histogram.observe(ctx, elapsed.as_secs_f64())
    }

    fn start(&self, ctx: &Context) -> TimerGuard<'_> {
        TimerGuard::new(self, ctx)
    }
}

impl TimerVec for Composite<TimerVecParts> {
    fn record(&self, ctx: &Context, elapsed: Duration, labels: &Labels) -> Result<()> {
        self.parts
            .histogram
            .observe(ctx, elapsed.as_secs_f64(), labels)
    }

    fn start(&self, ctx: &Context, labels: &Labels) -> TimerVecGuard<'_> {
        TimerVecGuard::new(self, ctx, labels)
    }
}

impl Cache for Composite<CacheParts> {
    fn hit(&self, ctx: &Context) -> Result<()> {
        self.parts.hits.inc(ctx)
    }

    fn miss(&self, ctx: &Context) -> Result<()> {
        self.parts.misses.inc(ctx)
    }

    fn set_size(&self, ctx: &Context, bytes: i64) -> Result<()> {
        self.parts.size.set(ctx, bytes as f64)
    }
}

impl CacheVec for Composite<CacheVecParts> {
    fn hit(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        self.parts.hits.inc(ctx, labels)
    }

    fn miss(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        self.parts.misses.inc(ctx, labels)
    }

    fn set_size(&self, ctx: &Context, bytes: i64, labels: &Labels) -> Result<()> {
        self.parts.size.set(ctx, bytes as f64, labels)
    }
}

impl Pool for Composite<PoolParts> {
    fn set_active(&self, ctx: &Context, count: usize) -> Result<()> {
        self.parts.active.set(ctx, count as f64)
    }

    fn set_idle(&self, ctx: &Context, count: usize) -> Result<()> {
        self.parts.idle.set(ctx, count as f64)
    }

    fn acquired(&self, ctx: &Context) -> Result<()> {
        self.parts.acquired.inc(ctx)
    }

    fn released(&self, ctx: &Context) -> Result<()> {
        self.parts.released.inc(ctx)
    }
}

impl PoolVec for Composite<PoolVecParts> {
    fn set_active(&self, ctx: &Context, count: usize, labels: &Labels) -> Result<()> {
        self.parts.active.set(ctx, count as f64, labels)
    }

    fn set_idle(&self, ctx: &Context, count: usize, labels: &Labels) -> Result<()> {
        self.parts.idle.set(ctx, count as f64, labels)
    }

    fn acquired(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        self.parts.acquired.inc(ctx, labels)
    }

    fn released(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        self.parts.released.inc(ctx, labels)
    }
}

impl CircuitBreaker for Composite<CircuitBreakerParts> {
    fn set_state(&self, ctx: &Context, state: CircuitBreakerState) -> Result<()> {
        self.parts.state.set(ctx, state.gauge_value())
    }

    fn success(&self, ctx: &Context) -> Result<()> {
        self.parts.successes.inc(ctx)
    }

    fn failure(&self, ctx: &Context) -> Result<()> {
        self.parts.failures.inc(ctx)
    }
}

impl CircuitBreakerVec for Composite<CircuitBreakerVecParts> {
    fn set_state(
        &self,
        ctx: &Context,
        state: CircuitBreakerState,
        labels: &Labels,
    ) -> Result<()> {
        self.parts.state.set(ctx, state.gauge_value(), labels)
    }

    fn success(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        self.parts.successes.inc(ctx, labels)
    }

    fn failure(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        self.parts.failures.inc(ctx, labels)
    }
}

impl Queue for Composite<QueueParts> {
    fn set_depth(&self, ctx: &Context, depth: usize) -> Result<()> {
        self.parts.depth.set(ctx, depth as f64)
    }

    fn enqueued(&self, ctx: &Context) -> Result<()> {
        self.parts.enqueued.inc(ctx)
    }

    fn dequeued(&self, ctx: &Context) -> Result<()> {
        self.parts.dequeued.inc(ctx)
    }

    fn set_wait_time(&self, ctx: &Context, wait: Duration) -> Result<()> {
        self.parts.wait_time.observe(ctx, wait.as_secs_f64())
    }
}

impl QueueVec for Composite<QueueVecParts> {
    fn set_depth(&self, ctx: &Context, depth: usize, labels: &Labels) -> Result<()> {
        self.parts.depth.set(ctx, depth as f64, labels)
    }

    fn enqueued(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        self.parts.enqueued.inc(ctx, labels)
    }

    fn dequeued(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        self.parts.dequeued.inc(ctx, labels)
    }

    fn set_wait_time(&self, ctx: &Context, wait: Duration, labels: &Labels) -> Result<()> {
        self.parts
            .wait_time
            .observe(ctx, wait.as_secs_f64(), labels)
    }
}
