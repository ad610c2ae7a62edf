//! Backend capability contract
//!
//! A backend turns metric construction parameters into adapters that actually
//! record observations. The enablement engine never inspects adapters; it only
//! decides whether to call them.

mod memory;
mod null;
#[cfg(feature = "prometheus")]
mod prometheus;

#[cfg(test)]
mod tests;

pub use memory::MemoryBackend;
pub use null::NullBackend;
#[cfg(feature = "prometheus")]
pub use self::prometheus::PrometheusBackend;

use crate::metrics::{
    CounterOpts, CounterVecOpts, GaugeOpts, GaugeVecOpts, HistogramOpts, HistogramVecOpts,
    SummaryOpts, SummaryVecOpts,
};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::fmt::Debug;

/// Label values keyed by label name
pub type Labels = HashMap<String, String>;

/// Build a [`Labels`] map from string pairs
pub fn labels<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Labels {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Constructs concrete metric adapters for one monitoring system
pub trait Backend: Send + Sync + Debug {
    /// Identifies the backend kind (e.g. "prometheus")
    fn name(&self) -> &str;

    fn counter(&self, opts: &CounterOpts) -> Result<Box<dyn CounterAdapter>>;
    fn counter_vec(&self, opts: &CounterVecOpts) -> Result<Box<dyn CounterVecAdapter>>;
    fn gauge(&self, opts: &GaugeOpts) -> Result<Box<dyn GaugeAdapter>>;
    fn gauge_vec(&self, opts: &GaugeVecOpts) -> Result<Box<dyn GaugeVecAdapter>>;
    fn histogram(&self, opts: &HistogramOpts) -> Result<Box<dyn HistogramAdapter>>;
    fn histogram_vec(&self, opts: &HistogramVecOpts) -> Result<Box<dyn HistogramVecAdapter>>;
    fn summary(&self, opts: &SummaryOpts) -> Result<Box<dyn SummaryAdapter>>;
    fn summary_vec(&self, opts: &SummaryVecOpts) -> Result<Box<dyn SummaryVecAdapter>>;
}

pub trait CounterAdapter: Send + Sync {
    fn inc(&self) -> Result<()>;
    fn add(&self, value: f64) -> Result<()>;
}

pub trait CounterVecAdapter: Send + Sync {
    fn inc(&self, labels: &Labels) -> Result<()>;
    fn add(&self, value: f64, labels: &Labels) -> Result<()>;
}

pub trait GaugeAdapter: Send + Sync {
    fn set(&self, value: f64) -> Result<()>;
    fn inc(&self) -> Result<()>;
    fn dec(&self) -> Result<()>;
    fn add(&self, value: f64) -> Result<()>;
}

pub trait GaugeVecAdapter: Send + Sync {
    fn set(&self, value: f64, labels: &Labels) -> Result<()>;
    fn inc(&self, labels: &Labels) -> Result<()>;
    fn dec(&self, labels: &Labels) -> Result<()>;
    fn add(&self, value: f64, labels: &Labels) -> Result<()>;
}

pub trait HistogramAdapter: Send + Sync {
    fn observe(&self, value: f64) -> Result<()>;
}

pub trait HistogramVecAdapter: Send + Sync {
    fn observe(&self, value: f64, labels: &Labels) -> Result<()>;
}

pub trait SummaryAdapter: Send + Sync {
    fn observe(&self, value: f64) -> Result<()>;
    fn quantile(&self, q: f64) -> Result<f64>;
}

pub trait SummaryVecAdapter: Send + Sync {
    fn observe(&self, value: f64, labels: &Labels) -> Result<()>;
    fn quantile(&self, q: f64, labels: &Labels) -> Result<f64>;
}

/// Stable key for a label set, independent of map iteration order
pub(crate) fn label_key(labels: &Labels) -> String {
    let mut pairs: Vec<_> = labels.iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}
