//! In-memory backend
//!
//! Keeps every value in process so tests and embedders can read back what was
//! recorded, and counts adapter invocations so callers can verify that
//! disabled metrics never reach a backend.

use super::{
    Backend, CounterAdapter, CounterVecAdapter, GaugeAdapter, GaugeVecAdapter, HistogramAdapter,
    HistogramVecAdapter, Labels, SummaryAdapter, SummaryVecAdapter, label_key,
};
use crate::metrics::{
    CounterOpts, CounterVecOpts, GaugeOpts, GaugeVecOpts, HistogramOpts, HistogramVecOpts,
    MetricOpts, SummaryOpts, SummaryVecOpts,
};
use crate::utils::error::{MetricsError, Result};
use crate::utils::stats::SampleWindow;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

fn series_key(name: &str, labels: &Labels) -> String {
    if labels.is_empty() {
        name.to_string()
    } else {
        format!("{}{{{}}}", name, label_key(labels))
    }
}

#[derive(Debug, Default)]
struct Store {
    values: RwLock<HashMap<String, f64>>,
    samples: RwLock<HashMap<String, SampleWindow>>,
    metrics: RwLock<HashSet<String>>,
    failing: RwLock<HashSet<String>>,
    calls: AtomicU64,
    constructed: AtomicU64,
}

impl Store {
    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    fn add_counter(&self, key: &str, value: f64) -> Result<()> {
        self.touch();
        if value < 0.0 {
            return Err(MetricsError::InvalidValue(format!(
                "counter `{}` cannot decrease (got {})",
                key, value
            )));
        }
        *self.values.write().entry(key.to_string()).or_insert(0.0) += value;
        Ok(())
    }

    fn add(&self, key: &str, value: f64) -> Result<()> {
        self.touch();
        *self.values.write().entry(key.to_string()).or_insert(0.0) += value;
        Ok(())
    }

    fn set(&self, key: &str, value: f64) -> Result<()> {
        self.touch();
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    fn observe(&self, key: &str, value: f64) -> Result<()> {
        self.touch();
        self.samples
            .write()
            .entry(key.to_string())
            .or_default()
            .push(value);
        Ok(())
    }

    fn quantile(&self, key: &str, q: f64) -> Result<f64> {
        self.touch();
        Ok(self
            .samples
            .read()
            .get(key)
            .map(|window| window.quantile(q))
            .unwrap_or(0.0))
    }
}

/// Backend that records into process memory.
///
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: Arc<Store>,
}

impl MemoryBackend {
    pub const NAME: &'static str = "memory";

    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later construction of `name` fail with a registration error
    pub fn fail_construction(&self, name: impl Into<String>) {
        self.store.failing.write().insert(name.into());
    }

    /// Undo [`fail_construction`](Self::fail_construction)
    pub fn allow_construction(&self, name: &str) {
        self.store.failing.write().remove(name);
    }

    /// Number of adapter invocations so far
    pub fn calls(&self) -> u64 {
        self.store.calls.load(Ordering::Relaxed)
    }

    /// Number of metrics successfully constructed so far
    pub fn constructed(&self) -> u64 {
        self.store.constructed.load(Ordering::Relaxed)
    }

    /// Whether a metric with this (qualified) name was constructed
    pub fn has_metric(&self, name: &str) -> bool {
        self.store.metrics.read().contains(name)
    }

    /// Current value of an unlabeled counter, 0 if never incremented
    pub fn counter_value(&self, name: &str) -> f64 {
        self.store.values.read().get(name).copied().unwrap_or(0.0)
    }

    /// Current value of an unlabeled gauge, if it was ever written
    pub fn gauge_value(&self, name: &str) -> Option<f64> {
        self.store.values.read().get(name).copied()
    }

    /// Current value of one labeled series
    pub fn labeled_value(&self, name: &str, labels: &Labels) -> Option<f64> {
        self.store
            .values
            .read()
            .get(&series_key(name, labels))
            .copied()
    }

    /// Observations retained for an unlabeled histogram or summary
    pub fn observations(&self, name: &str) -> Vec<f64> {
        self.labeled_observations(name, &Labels::new())
    }

    pub fn labeled_observations(&self, name: &str, labels: &Labels) -> Vec<f64> {
        self.store
            .samples
            .read()
            .get(&series_key(name, labels))
            .map(SampleWindow::values)
            .unwrap_or_default()
    }

    fn register(&self, opts: &impl MetricOpts) -> Result<Arc<Store>> {
        let name = opts.name();
        if self.store.failing.read().contains(name) {
            return Err(MetricsError::registration(
                name,
                "construction refused by memory backend",
            ));
        }
        self.store.metrics.write().insert(name.to_string());
        self.store.constructed.fetch_add(1, Ordering::Relaxed);
        Ok(self.store.clone())
    }

    fn series(&self, opts: &impl MetricOpts) -> Result<Series> {
        Ok(Series {
            store: self.register(opts)?,
            key: opts.name().to_string(),
        })
    }

    fn family(&self, opts: &impl MetricOpts) -> Result<Family> {
        Ok(Family {
            store: self.register(opts)?,
            name: opts.name().to_string(),
        })
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn counter(&self, opts: &CounterOpts) -> Result<Box<dyn CounterAdapter>> {
        Ok(Box::new(self.series(opts)?))
    }

    fn counter_vec(&self, opts: &CounterVecOpts) -> Result<Box<dyn CounterVecAdapter>> {
        Ok(Box::new(self.family(opts)?))
    }

    fn gauge(&self, opts: &GaugeOpts) -> Result<Box<dyn GaugeAdapter>> {
        Ok(Box::new(self.series(opts)?))
    }

    fn gauge_vec(&self, opts: &GaugeVecOpts) -> Result<Box<dyn GaugeVecAdapter>> {
        Ok(Box::new(self.family(opts)?))
    }

    fn histogram(&self, opts: &HistogramOpts) -> Result<Box<dyn HistogramAdapter>> {
        Ok(Box::new(self.series(opts)?))
    }

    fn histogram_vec(&self, opts: &HistogramVecOpts) -> Result<Box<dyn HistogramVecAdapter>> {
        Ok(Box::new(self.family(opts)?))
    }

    fn summary(&self, opts: &SummaryOpts) -> Result<Box<dyn SummaryAdapter>> {
        Ok(Box::new(self.series(opts)?))
    }

    fn summary_vec(&self, opts: &SummaryVecOpts) -> Result<Box<dyn SummaryVecAdapter>> {
        Ok(Box::new(self.family(opts)?))
    }
}

/// One unlabeled series
struct Series {
    store: Arc<Store>,
    key: String,
}

/// A labeled metric; each label set is its own series
struct Family {
    store: Arc<Store>,
    name: String,
}

impl Family {
    fn key(&self, labels: &Labels) -> String {
        series_key(&self.name, labels)
    }
}

impl CounterAdapter for Series {
    fn inc(&self) -> Result<()> {
        self.store.add_counter(&self.key, 1.0)
    }

    fn add(&self, value: f64) -> Result<()> {
        self.store.add_counter(&self.key, value)
    }
}

impl CounterVecAdapter for Family {
    fn inc(&self, labels: &Labels) -> Result<()> {
        self.store.add_counter(&self.key(labels), 1.0)
    }

    fn add(&self, value: f64, labels: &Labels) -> Result<()> {
        self.store.add_counter(&self.key(labels), value)
    }
}

impl GaugeAdapter for Series {
    fn set(&self, value: f64) -> Result<()> {
        self.store.set(&self.key, value)
    }

    fn inc(&self) -> Result<()> {
        self.store.add(&self.key, 1.0)
    }

    fn dec(&self) -> Result<()> {
        self.store.add(&self.key, -1.0)
    }

    fn add(&self, value: f64) -> Result<()> {
        self.store.add(&self.key, value)
    }
}

impl GaugeVecAdapter for Family {
    fn set(&self, value: f64, labels: &Labels) -> Result<()> {
        self.store.set(&self.key(labels), value)
    }

    fn inc(&self, labels: &Labels) -> Result<()> {
        self.store.add(&self.key(labels), 1.0)
    }

    fn dec(&self, labels: &Labels) -> Result<()> {
        self.store.add(&self.key(labels), -1.0)
    }

    fn add(&self, value: f64, labels: &Labels) -> Result<()> {
        self.store.add(&self.key(labels), value)
    }
}

impl HistogramAdapter for Series {
    fn observe(&self, value: f64) -> Result<()> {
        self.store.observe(&self.key, value)
    }
}

impl HistogramVecAdapter for Family {
    fn observe(&self, value: f64, labels: &Labels) -> Result<()> {
        self.store.observe(&self.key(labels), value)
    }
}

impl SummaryAdapter for Series {
    fn observe(&self, value: f64) -> Result<()> {
        self.store.observe(&self.key, value)
    }

    fn quantile(&self, q: f64) -> Result<f64> {
        self.store.quantile(&self.key, q)
    }
}

impl SummaryVecAdapter for Family {
    fn observe(&self, value: f64, labels: &Labels) -> Result<()> {
        self.store.observe(&self.key(labels), value)
    }

    fn quantile(&self, q: f64, labels: &Labels) -> Result<f64> {
        self.store.quantile(&self.key(labels), q)
    }
}
