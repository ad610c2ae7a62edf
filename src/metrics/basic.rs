//! Backend-backed basic metrics

use super::kinds::{
    Counter, CounterVec, Gauge, GaugeVec, Histogram, HistogramVec, Summary, SummaryVec,
};
use super::{Metric, MetricInfo, MetricKind};
use crate::backend::{
    CounterAdapter, CounterVecAdapter, GaugeAdapter, GaugeVecAdapter, HistogramAdapter,
    HistogramVecAdapter, Labels, SummaryAdapter, SummaryVecAdapter,
};
use crate::policy::{AtomicLevel, Context, Level, Mask};
use crate::utils::error::Result;

/// A basic metric that forwards to a backend adapter whenever the caller's
/// context admits its declared level and mask
pub struct Gated<A: ?Sized> {
    info: MetricInfo,
    level: AtomicLevel,
    adapter: Box<A>,
}

impl<A: ?Sized> Gated<A> {
    pub fn new(info: MetricInfo, level: Level, adapter: Box<A>) -> Self {
        Self {
            info,
            level: AtomicLevel::new(level),
            adapter,
        }
    }

    #[inline]
    fn admits(&self, ctx: &Context) -> bool {
        ctx.allows(self.level.get(), self.info.mask)
    }
}

impl<A: ?Sized + Send + Sync> Metric for Gated<A> {
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
    }

    fn kind(&self) -> MetricKind {
        MetricKind::Basic
    }
}

impl Counter for Gated<dyn CounterAdapter> {
    fn inc(&self, ctx: &Context) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.inc()
    }

    fn add(&self, ctx: &Context, value: f64) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.add(value)
    }
}

impl CounterVec for Gated<dyn CounterVecAdapter> {
    fn inc(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.inc(labels)
    }

    fn add(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.add(value, labels)
    }
}

impl Gauge for Gated<dyn GaugeAdapter> {
    fn set(&self, ctx: &Context, value: f64) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.set(value)
    }

    fn inc(&self, ctx: &Context) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.inc()
    }

    fn dec(&self, ctx: &Context) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.dec()
    }

    fn add(&self, ctx: &Context, value: f64) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.add(value)
    }
}

impl GaugeVec for Gated<dyn GaugeVecAdapter> {
    fn set(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.set(value, labels)
    }

    fn inc(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.inc(labels)
    }

    fn dec(&self, ctx: &Context, labels: &Labels) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.dec(labels)
    }

    fn add(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.add(value, labels)
    }
}

impl Histogram for Gated<dyn HistogramAdapter> {
    fn observe(&self, ctx: &Context, value: f64) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.observe(value)
    }
}

impl HistogramVec for Gated<dyn HistogramVecAdapter> {
    fn observe(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.observe(value, labels)
    }
}

impl Summary for Gated<dyn SummaryAdapter> {
    fn observe(&self, ctx: &Context, value: f64) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.observe(value)
    }

    fn quantile(&self, ctx: &Context, q: f64) -> Result<f64> {
        if !self.admits(ctx) {
            return Ok(0.0);
        }
        self.adapter.quantile(q)
    }
}

impl SummaryVec for Gated<dyn SummaryVecAdapter> {
    fn observe(&self, ctx: &Context, value: f64, labels: &Labels) -> Result<()> {
        if !self.admits(ctx) {
            return Ok(());
        }
        self.adapter.observe(value, labels)
    }

    fn quantile(&self, ctx: &Context, q: f64, labels: &Labels) -> Result<f64> {
        if !self.admits(ctx) {
            return Ok(0.0);
        }
        self.adapter.quantile(q, labels)
    }
}
