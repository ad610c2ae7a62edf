//! Metric contracts and their implementations
//!
//! Every metric kind is a trait over [`Metric`]. Each kind has three
//! implementations:
//!
//! - a gated one forwarding to a backend adapter (composites forward to their
//!   components instead)
//! - a [`Noop`] one that records nothing but remembers how it was built
//! - [`Switchable`], the handle handed to callers, whose backing implementation
//!   can be replaced without the caller noticing

mod basic;
mod composite;
mod kinds;
mod noop;
mod opts;
mod switchable;


pub use basic::Gated;
pub use composite::{
    CacheParts, CacheVecParts, CircuitBreakerParts, CircuitBreakerVecParts, Composite, Parts,
    PoolParts, PoolVecParts, QueueParts, QueueVecParts, TimerParts, TimerVecParts,
};
pub use kinds::{
    Cache, CacheVec, CircuitBreaker, CircuitBreakerState, CircuitBreakerVec, Counter, CounterVec,
    Gauge, GaugeVec, Histogram, HistogramVec, Pool, PoolVec, Queue, QueueVec, Summary, SummaryVec,
    Timer, TimerGuard, TimerVec, TimerVecGuard,
};
pub use noop::{Noop, NoopComposite};
pub use opts::{
    CacheOpts, CacheVecOpts, CircuitBreakerOpts, CircuitBreakerVecOpts, CounterOpts,
    CounterVecOpts, DEFAULT_LATENCY_BUCKETS, GaugeOpts, GaugeVecOpts, HistogramOpts,
    HistogramVecOpts, MetricInfo, MetricOpts, PoolOpts, PoolVecOpts, QueueOpts, QueueVecOpts,
    SummaryOpts, SummaryVecOpts, TimerOpts, TimerVecOpts,
};
pub use switchable::{BasicKind, CompositeKind, Kind, MetricFactory, Switchable};

pub(crate) use switchable::sealed::Upgrade;

use crate::policy::{Level, Mask};
use std::sync::Arc;

/// Handle type returned by group factories
pub type Handle<T> = Arc<Switchable<T>>;

/// Whether a metric records directly or through components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Basic,
    Composite,
}

/// Behaviour common to every metric
pub trait Metric: Send + Sync {
    fn name(&self) -> &str;

    fn help(&self) -> &str;

    /// Declared level, compared against the caller's context
    fn level(&self) -> Level;

    /// Declared categories, compared against the caller's context
    fn mask(&self) -> Mask;

    /// Replace the declared level. Composites forward this to their
    /// components.
    fn set_level(&self, level: Level);

    fn kind(&self) -> MetricKind;
}

/// A metric assembled from other metrics
pub trait CompositeMetric: Metric {
    /// The component metrics, in declaration order
    fn components(&self) -> Vec<Arc<dyn SwitchableMetric>>;
}

/// Type-erased view of a [`Switchable`]
pub trait SwitchableMetric: Metric + Upgrade {
    /// Whether the metric is currently backed by a noop
    fn is_noop(&self) -> bool;
}
