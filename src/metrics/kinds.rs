//! One contract per metric kind
//!
//! Every operation takes the caller's [`Context`]. Implementations record only
//! when the context admits the metric's declared level and mask; otherwise the
//! call succeeds without touching the backend.

use super::{CompositeMetric, Metric};
use crate::backend::Labels;
use crate::policy::Context;
use crate::utils::error::{MetricsError, Result};
use std::time::{Duration, Instant};

pub trait Counter: Metric {
    fn inc(&self, ctx: &Context) -> Result<()>;

    fn add(&self, ctx: &Context, value: f64) -> Result<()>;
}

pub trait CounterVec: Metric {
    fn inc(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn add(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()>;
}

pub trait Gauge: Metric {
    fn set(&self, ctx: &Context, value: f64) -> Result<()>;

    fn inc(&self, ctx: &Context) -> Result<()>;

    fn dec(&self, ctx: &Context) -> Result<()>;

    fn add(&self, ctx: &Context, value: f64) -> Result<()>;
}

pub trait GaugeVec: Metric {
    fn set(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()>;

    fn inc(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn dec(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn add(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()>;
}

pub trait Histogram: Metric {
    fn observe(&self, ctx: &Context, value: f64) -> Result<()>;

    /// Run `f` and observe its duration in seconds.
    ///
    /// `f` always runs. The duration is observed even when `f` fails, and
    /// `f`'s error takes precedence over a recording error.
    fn time<T, E>(
        &self,
        ctx: &Context,
        f: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        Self: Sized,
        E: From<MetricsError>,
    {
        if !ctx.allows(self.level(), self.mask()) {
            return f();
        }
        let started = Instant::now();
        let outcome = f();
        let recorded = self.observe(ctx, started.elapsed().as_secs_f64());
        let value = outcome?;
        recorded?;
        Ok(value)
    }
}

pub trait HistogramVec: Metric {
    fn observe(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()>;
}

pub trait Summary: Metric {
    fn observe(&self, ctx: &Context, value: f64) -> Result<()>;

    /// Current estimate of quantile `q`, 0 when disabled
    fn quantile(&self, ctx: &Context, q: f64) -> Result<f64>;
}

pub trait SummaryVec: Metric {
    fn observe(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()>;

    fn quantile(&self, ctx: &Context, q: f64, labels: &Labels) -> Result<f64>;
}

/// Duration recorder backed by a histogram
pub trait Timer: CompositeMetric {
    fn record(&self, ctx: &Context, elapsed: Duration) -> Result<()>;

    /// Start measuring. The returned guard records when stopped or dropped.
    fn start(&self, ctx: &Context) -> TimerGuard<'_>;

    /// Run `f` and record its duration. `f` always runs.
    fn time<T, E>(
        &self,
        ctx: &Context,
        f: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        Self: Sized,
        E: From<MetricsError>,
    {
        // Gating happens in the histogram component
        let started = Instant::now();
        let outcome = f();
        let recorded = self.record(ctx, started.elapsed());
        let value = outcome?;
        recorded?;
        Ok(value)
    }
}

pub trait TimerVec: CompositeMetric {
    fn record(&self, ctx: &Context, elapsed: Duration, labels: &Labels) -> Result<()>;

    fn start(&self, ctx: &Context, labels: &Labels) -> TimerVecGuard<'_>;

    fn time<T, E>(
        &self,
        ctx: &Context,
        labels: &Labels,
        f: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E>
    where
        Self: Sized,
        E: From<MetricsError>,
    {
        // Gating happens in the histogram component
        let started = Instant::now();
        let outcome = f();
        let recorded = self.record(ctx, started.elapsed(), labels);
        let value = outcome?;
        recorded?;
        Ok(value)
    }
}

pub trait Cache: CompositeMetric {
    fn hit(&self, ctx: &Context) -> Result<()>;

    fn miss(&self, ctx: &Context) -> Result<()>;

    fn set_size(&self, ctx: &Context, bytes: i64) -> Result<()>;
}

pub trait CacheVec: CompositeMetric {
    fn hit(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn miss(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn set_size(&self, ctx: &Context, bytes: i64, labels: &Labels) -> Result<()>;
}

pub trait Pool: CompositeMetric {
    fn set_active(&self, ctx: &Context, count: usize) -> Result<()>;

    fn set_idle(&self, ctx: &Context, count: usize) -> Result<()>;

    fn acquired(&self, ctx: &Context) -> Result<()>;

    fn released(&self, ctx: &Context) -> Result<()>;
}

pub trait PoolVec: CompositeMetric {
    fn set_active(&self, ctx: &Context, count: usize, labels: &Labels) -> Result<()>;

    fn set_idle(&self, ctx: &Context, count: usize, labels: &Labels) -> Result<()>;

    fn acquired(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn released(&self, ctx: &Context, labels: &Labels) -> Result<()>;
}

/// Circuit breaker position, recorded as a gauge value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitBreakerState {
    pub fn gauge_value(self) -> f64 {
        match self {
            CircuitBreakerState::Closed => 0.0,
            CircuitBreakerState::Open => 1.0,
            CircuitBreakerState::HalfOpen => 2.0,
        }
    }
}

pub trait CircuitBreaker: CompositeMetric {
    fn set_state(&self, ctx: &Context, state: CircuitBreakerState) -> Result<()>;

    fn success(&self, ctx: &Context) -> Result<()>;

    fn failure(&self, ctx: &Context) -> Result<()>;
}

pub trait CircuitBreakerVec: CompositeMetric {
    fn set_state(&self, ctx: &Context, state: CircuitBreakerState, labels: &Labels)
    -> Result<()>;

    fn success(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn failure(&self, ctx: &Context, labels: &Labels) -> Result<()>;
}

pub trait Queue: CompositeMetric {
    fn set_depth(&self, ctx: &Context, depth: usize) -> Result<()>;

    fn enqueued(&self, ctx: &Context) -> Result<()>;

    fn dequeued(&self, ctx: &Context) -> Result<()>;

    fn set_wait_time(&self, ctx: &Context, wait: Duration) -> Result<()>;
}

pub trait QueueVec: CompositeMetric {
    fn set_depth(&self, ctx: &Context, depth: usize, labels: &Labels) -> Result<()>;

    fn enqueued(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn dequeued(&self, ctx: &Context, labels: &Labels) -> Result<()>;

    fn set_wait_time(&self, ctx: &Context, wait: Duration, labels: &Labels) -> Result<()>;
}

/// Pending duration measurement started by [`Timer::start`].
///
/// The guard is inert when the timer was disabled for the starting context.
#[must_use = "dropping the guard records immediately"]
pub struct TimerGuard<'a> {
    timer: &'a dyn Timer,
    ctx: Context,
    started: Option<Instant>,
}

impl<'a> TimerGuard<'a> {
    pub fn new(timer: &'a dyn Timer, ctx: &Context) -> Self {
        let started = ctx
            .allows(timer.level(), timer.mask())
            .then(Instant::now);
        Self {
            timer,
            ctx: *ctx,
            started,
        }
    }

    /// A guard that never records
    pub fn inert(timer: &'a dyn Timer, ctx: &Context) -> Self {
        Self {
            timer,
            ctx: *ctx,
            started: None,
        }
    }

    /// Whether stopping the guard will record anything
    pub fn is_armed(&self) -> bool {
        self.started.is_some()
    }

    /// Record the elapsed time now
    pub fn stop(mut self) -> Result<()> {
        match self.started.take() {
            Some(started) => self.timer.record(&self.ctx, started.elapsed()),
            None => Ok(()),
        }
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        if let Some(started) = self.started.take() {
            let _ = self.timer.record(&self.ctx, started.elapsed());
        }
    }
}

/// Labeled counterpart of [`TimerGuard`]
#[must_use = "dropping the guard records immediately"]
pub struct TimerVecGuard<'a> {
    timer: &'a dyn TimerVec,
    ctx: Context,
    labels: Labels,
    started: Option<Instant>,
}

impl<'a> TimerVecGuard<'a> {
    pub fn new(timer: &'a dyn TimerVec, ctx: &Context, labels: &Labels) -> Self {
        let started = ctx
            .allows(timer.level(), timer.mask())
            .then(Instant::now);
        Self {
            timer,
            ctx: *ctx,
            labels: labels.clone(),
            started,
        }
    }

    pub fn inert(timer: &'a dyn TimerVec, ctx: &Context, labels: &Labels) -> Self {
        Self {
            timer,
            ctx: *ctx,
            labels: labels.clone(),
            started: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.started.is_some()
    }

    pub fn stop(mut self) -> Result<()> {
        match self.started.take() {
            Some(started) => self
                .timer
                .record(&self.ctx, started.elapsed(), &self.labels),
            None => Ok(()),
        }
    }
}

impl Drop for TimerVecGuard<'_> {
    fn drop(&mut self) {
        if let Some(started) = self.started.take() {
            let _ = self.timer.record(&self.ctx, started.elapsed(), &self.labels);
        }
    }
}
