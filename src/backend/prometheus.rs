//! Prometheus backend
//!
//! Every metric is registered in a [`prometheus::Registry`]. The Rust client
//! has no summary type, so summaries are exported as histograms and answer
//! quantile queries from an in-process sample window.

use super::{
    Backend, CounterAdapter, CounterVecAdapter, GaugeAdapter, GaugeVecAdapter, HistogramAdapter,
    HistogramVecAdapter, Labels, SummaryAdapter, SummaryVecAdapter, label_key,
};
use crate::metrics::{
    CounterOpts, CounterVecOpts, GaugeOpts, GaugeVecOpts, HistogramOpts, HistogramVecOpts,
    MetricInfo, SummaryOpts, SummaryVecOpts,
};
use crate::utils::error::{MetricsError, Result};
use crate::utils::stats::SampleWindow;
use parking_lot::Mutex;
use prometheus::core::Collector;
use prometheus::{Encoder, Registry, TextEncoder};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Tolerance when matching a requested quantile against declared objectives
const OBJECTIVE_EPSILON: f64 = 1e-9;

/// Backend registering metrics with a Prometheus registry
#[derive(Clone)]
pub struct PrometheusBackend {
    registry: Registry,
}

impl fmt::Debug for PrometheusBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrometheusBackend").finish_non_exhaustive()
    }
}

impl Default for PrometheusBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusBackend {
    pub const NAME: &'static str = "prometheus";

    /// Backend with its own private registry
    pub fn new() -> Self {
        Self::with_registry(Registry::new())
    }

    /// Backend registering into an existing registry
    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render everything registered so far in the text exposition format
    pub fn gather_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MetricsError::backend(e.to_string()))
    }

    fn register<C>(&self, info: &MetricInfo, collector: prometheus::Result<C>) -> Result<C>
    where
        C: Collector + Clone + 'static,
    {
        let collector = collector.map_err(|e| MetricsError::registration(&info.name, e))?;
        self.registry
            .register(Box::new(collector.clone()))
            .map_err(|e| MetricsError::registration(&info.name, e))?;
        debug!(metric = %info.name, "Registered Prometheus collector");
        Ok(collector)
    }
}

fn opts(info: &MetricInfo) -> prometheus::Opts {
    prometheus::Opts::new(info.name.as_str(), help(info))
}

fn histogram_opts(info: &MetricInfo, buckets: &[f64]) -> prometheus::HistogramOpts {
    let opts = prometheus::HistogramOpts::new(info.name.as_str(), help(info));
    if buckets.is_empty() {
        opts
    } else {
        opts.buckets(buckets.to_vec())
    }
}

// Prometheus rejects empty help strings
fn help(info: &MetricInfo) -> String {
    if info.help.is_empty() {
        info.name.clone()
    } else {
        info.help.clone()
    }
}

fn label_refs(labels: &Labels) -> HashMap<&str, &str> {
    labels
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}

fn names(labels: &[String]) -> Vec<&str> {
    labels.iter().map(String::as_str).collect()
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value < 0.0 {
        return Err(MetricsError::InvalidValue(format!(
            "counter `{}` cannot decrease (got {})",
            name, value
        )));
    }
    Ok(())
}

fn tracks(objectives: &[(f64, f64)], q: f64) -> bool {
    objectives
        .iter()
        .any(|(objective, _)| (objective - q).abs() < OBJECTIVE_EPSILON)
}

impl Backend for PrometheusBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn counter(&self, o: &CounterOpts) -> Result<Box<dyn CounterAdapter>> {
        let inner = self.register(&o.info, prometheus::Counter::with_opts(opts(&o.info)))?;
        Ok(Box::new(PromCounter {
            name: o.info.name.clone(),
            inner,
        }))
    }

    fn counter_vec(&self, o: &CounterVecOpts) -> Result<Box<dyn CounterVecAdapter>> {
        let inner = self.register(
            &o.info,
            prometheus::CounterVec::new(opts(&o.info), &names(&o.labels)),
        )?;
        Ok(Box::new(PromCounterVec {
            name: o.info.name.clone(),
            inner,
        }))
    }

    fn gauge(&self, o: &GaugeOpts) -> Result<Box<dyn GaugeAdapter>> {
        let inner = self.register(&o.info, prometheus::Gauge::with_opts(opts(&o.info)))?;
        Ok(Box::new(PromGauge(inner)))
    }

    fn gauge_vec(&self, o: &GaugeVecOpts) -> Result<Box<dyn GaugeVecAdapter>> {
        let inner = self.register(
            &o.info,
            prometheus::GaugeVec::new(opts(&o.info), &names(&o.labels)),
        )?;
        Ok(Box::new(PromGaugeVec(inner)))
    }

    fn histogram(&self, o: &HistogramOpts) -> Result<Box<dyn HistogramAdapter>> {
        let inner = self.register(
            &o.info,
            prometheus::Histogram::with_opts(histogram_opts(&o.info, &o.buckets)),
        )?;
        Ok(Box::new(PromHistogram(inner)))
    }

    fn histogram_vec(&self, o: &HistogramVecOpts) -> Result<Box<dyn HistogramVecAdapter>> {
        let inner = self.register(
            &o.info,
            prometheus::HistogramVec::new(histogram_opts(&o.info, &o.buckets), &names(&o.labels)),
        )?;
        Ok(Box::new(PromHistogramVec(inner)))
    }

    fn summary(&self, o: &SummaryOpts) -> Result<Box<dyn SummaryAdapter>> {
        let inner = self.register(
            &o.info,
            prometheus::Histogram::with_opts(histogram_opts(&o.info, &[])),
        )?;
        Ok(Box::new(PromSummary {
            inner,
            objectives: o.objectives.clone(),
            window: Mutex::new(SampleWindow::default()),
        }))
    }

    fn summary_vec(&self, o: &SummaryVecOpts) -> Result<Box<dyn SummaryVecAdapter>> {
        let inner = self.register(
            &o.info,
            prometheus::HistogramVec::new(histogram_opts(&o.info, &[]), &names(&o.labels)),
        )?;
        Ok(Box::new(PromSummaryVec {
            inner,
            objectives: o.objectives.clone(),
            windows: Mutex::new(HashMap::new()),
        }))
    }
}

struct PromCounter {
    name: String,
    inner: prometheus::Counter,
}

impl CounterAdapter for PromCounter {
    fn inc(&self) -> Result<()> {
        self.inner.inc();
        Ok(())
    }

    fn add(&self, value: f64) -> Result<()> {
        non_negative(&self.name, value)?;
        self.inner.inc_by(value);
        Ok(())
    }
}

struct PromCounterVec {
    name: String,
    inner: prometheus::CounterVec,
}

impl CounterVecAdapter for PromCounterVec {
    fn inc(&self, labels: &Labels) -> Result<()> {
        self.inner.get_metric_with(&label_refs(labels))?.inc();
        Ok(())
    }

    fn add(&self, value: f64, labels: &Labels) -> Result<()> {
        non_negative(&self.name, value)?;
        self.inner.get_metric_with(&label_refs(labels))?.inc_by(value);
        Ok(())
    }
}

struct PromGauge(prometheus::Gauge);

impl GaugeAdapter for PromGauge {
    fn set(&self, value: f64) -> Result<()> {
        self.0.set(value);
        Ok(())
    }

    fn inc(&self) -> Result<()> {
        self.0.inc();
        Ok(())
    }

    fn dec(&self) -> Result<()> {
        self.0.dec();
        Ok(())
    }

    fn add(&self, value: f64) -> Result<()> {
        self.0.add(value);
        Ok(())
    }
}

struct PromGaugeVec(prometheus::GaugeVec);

impl GaugeVecAdapter for PromGaugeVec {
    fn set(&self, value: f64, labels: &Labels) -> Result<()> {
        self.0.get_metric_with(&label_refs(labels))?.set(value);
        Ok(())
    }

    fn inc(&self, labels: &Labels) -> Result<()> {
        self.0.get_metric_with(&label_refs(labels))?.inc();
        Ok(())
    }

    fn dec(&self, labels: &Labels) -> Result<()> {
        self.0.get_metric_with(&label_refs(labels))?.dec();
        Ok(())
    }

    fn add(&self, value: f64, labels: &Labels) -> Result<()> {
        self.0.get_metric_with(&label_refs(labels))?.add(value);
        Ok(())
    }
}

struct PromHistogram(prometheus::Histogram);

impl HistogramAdapter for PromHistogram {
    fn observe(&self, value: f64) -> Result<()> {
        self.0.observe(value);
        Ok(())
    }
}

struct PromHistogramVec(prometheus::HistogramVec);

impl HistogramVecAdapter for PromHistogramVec {
    fn observe(&self, value: f64, labels: &Labels) -> Result<()> {
        self.0.get_metric_with(&label_refs(labels))?.observe(value);
        Ok(())
    }
}

struct PromSummary {
    inner: prometheus::Histogram,
    objectives: Vec<(f64, f64)>,
    window: Mutex<SampleWindow>,
}

impl SummaryAdapter for PromSummary {
    fn observe(&self, value: f64) -> Result<()> {
        self.inner.observe(value);
        self.window.lock().push(value);
        Ok(())
    }

    fn quantile(&self, q: f64) -> Result<f64> {
        if !tracks(&self.objectives, q) {
            return Err(MetricsError::QuantileUnavailable(q));
        }
        Ok(self.window.lock().quantile(q))
    }
}

struct PromSummaryVec {
    inner: prometheus::HistogramVec,
    objectives: Vec<(f64, f64)>,
    windows: Mutex<HashMap<String, SampleWindow>>,
}

impl SummaryVecAdapter for PromSummaryVec {
    fn observe(&self, value: f64, labels: &Labels) -> Result<()> {
        self.inner.get_metric_with(&label_refs(labels))?.observe(value);
        self.windows
            .lock()
            .entry(label_key(labels))
            .or_default()
            .push(value);
        Ok(())
    }

    fn quantile(&self, q: f64, labels: &Labels) -> Result<f64> {
        if !tracks(&self.objectives, q) {
            return Err(MetricsError::QuantileUnavailable(q));
        }
        Ok(self
            .windows
            .lock()
            .get(&label_key(labels))
            .map(|window| window.quantile(q))
            .unwrap_or(0.0))
    }
}
