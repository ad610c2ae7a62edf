//! Backend that discards everything

use super::{
    Backend, CounterAdapter, CounterVecAdapter, GaugeAdapter, GaugeVecAdapter, HistogramAdapter,
    HistogramVecAdapter, Labels, SummaryAdapter, SummaryVecAdapter,
};
use crate::metrics::{
    CounterOpts, CounterVecOpts, GaugeOpts, GaugeVecOpts, HistogramOpts, HistogramVecOpts,
    SummaryOpts, SummaryVecOpts,
};
use crate::utils::error::Result;

/// Accepts every metric and every observation, records nothing.
///
/// Selected by the `"none"` backend kind in configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl NullBackend {
    pub const NAME: &'static str = "none";
}

struct Discard;

impl Backend for NullBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn counter(&self, _: &CounterOpts) -> Result<Box<dyn CounterAdapter>> {
        Ok(Box::new(Discard))
    }

    fn counter_vec(&self, _: &CounterVecOpts) -> Result<Box<dyn CounterVecAdapter>> {
        Ok(Box::new(Discard))
    }

    fn gauge(&self, _: &GaugeOpts) -> Result<Box<dyn GaugeAdapter>> {
        Ok(Box::new(Discard))
    }

    fn gauge_vec(&self, _: &GaugeVecOpts) -> Result<Box<dyn GaugeVecAdapter>> {
        Ok(Box::new(Discard))
    }

    fn histogram(&self, _: &HistogramOpts) -> Result<Box<dyn HistogramAdapter>> {
        Ok(Box::new(Discard))
    }

    fn histogram_vec(&self, _: &HistogramVecOpts) -> Result<Box<dyn HistogramVecAdapter>> {
        Ok(Box::new(Discard))
    }

    fn summary(&self, _: &SummaryOpts) -> Result<Box<dyn SummaryAdapter>> {
        Ok(Box::new(Discard))
    }

    fn summary_vec(&self, _: &SummaryVecOpts) -> Result<Box<dyn SummaryVecAdapter>> {
        Ok(Box::new(Discard))
    }
}

impl CounterAdapter for Discard {
    fn inc(&self) -> Result<()> {
        Ok(())
    }

    fn add(&self, _: f64) -> Result<()> {
        Ok(())
    }
}

impl CounterVecAdapter for Discard {
    fn inc(&self, _: &Labels) -> Result<()> {
        Ok(())
    }

    fn add(&self, _: f64, _: &Labels) -> Result<()> {
        Ok(())
    }
}

impl GaugeAdapter for Discard {
    fn set(&self, _: f64) -> Result<()> {
        Ok(())
    }

    fn inc(&self) -> Result<()> {
        Ok(())
    }

    fn dec(&self) -> Result<()> {
        Ok(())
    }

    fn add(&self, _: f64) -> Result<()> {
        Ok(())
    }
}

impl GaugeVecAdapter for Discard {
    fn set(&self, _: f64, _: &Labels) -> Result<()> {
        Ok(())
    }

    fn inc(&self, _: &Labels) -> Result<()> {
        Ok(())
    }

    fn dec(&self, _: &Labels) -> Result<()> {
        Ok(())
    }

    fn add(&self, _: f64, _: &Labels) -> Result<()> {
        Ok(())
    }
}

impl HistogramAdapter for Discard {
    fn observe(&self, _: f64) -> Result<()> {
        Ok(())
    }
}

impl HistogramVecAdapter for Discard {
    fn observe(&self, _: f64, _: &Labels) -> Result<()> {
        Ok(())
    }
}

impl SummaryAdapter for Discard {
    fn observe(&self, _: f64) -> Result<()> {
        Ok(())
    }

    fn quantile(&self, _: f64) -> Result<f64> {
        Ok(0.0)
    }
}

impl SummaryVecAdapter for Discard {
    fn observe(&self, _: f64, _: &Labels) -> Result<()> {
        Ok(())
    }

    fn quantile(&self, _: f64, _: &Labels) -> Result<f64> {
        Ok(0.0)
    }
}
