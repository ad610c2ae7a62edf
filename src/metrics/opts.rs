//! Construction parameters for every metric kind
//!
//! Basic options carry a [`MetricInfo`] plus whatever the backend needs to
//! build the metric (label names, buckets, objectives). Composite options own
//! one option set per component, pre-filled from the composite's name.

use crate::policy::Mask;
use crate::utils::qualify_name;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

fn default_mask() -> Mask {
    Mask::ALL
}

/// Identity shared by all metric kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricInfo {
    pub name: String,
    #[serde(default)]
    pub help: String,
    /// Categories the metric belongs to
    #[serde(default = "default_mask")]
    pub mask: Mask,
}

impl MetricInfo {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            mask: default_mask(),
        }
    }
}

/// Access to the identity of an options struct
pub trait MetricOpts: Clone + Debug + Send + Sync + 'static {
    fn info(&self) -> &MetricInfo;

    fn info_mut(&mut self) -> &mut MetricInfo;

    fn name(&self) -> &str {
        &self.info().name
    }

    fn set_mask(&mut self, mask: Mask) {
        self.info_mut().mask = mask;
    }

    /// Prefix the metric name (and component names) with a group name
    fn qualify(&mut self, group: &str) {
        let info = self.info_mut();
        info.name = qualify_name(group, &info.name);
    }

    #[must_use]
    fn with_mask(mut self, mask: Mask) -> Self {
        self.set_mask(mask);
        self
    }
}

fn label_names<S: AsRef<str>>(labels: &[S]) -> Vec<String> {
    labels.iter().map(|l| l.as_ref().to_string()).collect()
}

macro_rules! basic_opts {
    ($($opts:ty),+ $(,)?) => {
        $(
            impl MetricOpts for $opts {
                fn info(&self) -> &MetricInfo {
                    &self.info
                }

                fn info_mut(&mut self) -> &mut MetricInfo {
                    &mut self.info
                }
            }
        )+
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterOpts {
    pub info: MetricInfo,
}

impl CounterOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            info: MetricInfo::new(name, help),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterVecOpts {
    pub info: MetricInfo,
    pub labels: Vec<String>,
}

impl CounterVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        Self {
            info: MetricInfo::new(name, help),
            labels: label_names(labels),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeOpts {
    pub info: MetricInfo,
}

impl GaugeOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            info: MetricInfo::new(name, help),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeVecOpts {
    pub info: MetricInfo,
    pub labels: Vec<String>,
}

impl GaugeVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        Self {
            info: MetricInfo::new(name, help),
            labels: label_names(labels),
        }
    }
}

/// Histogram options. Empty `buckets` leaves the choice to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramOpts {
    pub info: MetricInfo,
    pub buckets: Vec<f64>,
}

impl HistogramOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            info: MetricInfo::new(name, help),
            buckets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_buckets(mut self, buckets: Vec<f64>) -> Self {
        self.buckets = buckets;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramVecOpts {
    pub info: MetricInfo,
    pub labels: Vec<String>,
    pub buckets: Vec<f64>,
}

impl HistogramVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        Self {
            info: MetricInfo::new(name, help),
            labels: label_names(labels),
            buckets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_buckets(mut self, buckets: Vec<f64>) -> Self {
        self.buckets = buckets;
        self
    }
}

/// Summary options. `objectives` maps each tracked quantile to its
/// allowed absolute error.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOpts {
    pub info: MetricInfo,
    pub objectives: Vec<(f64, f64)>,
}

impl SummaryOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            info: MetricInfo::new(name, help),
            objectives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_objectives(mut self, objectives: Vec<(f64, f64)>) -> Self {
        self.objectives = objectives;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryVecOpts {
    pub info: MetricInfo,
    pub labels: Vec<String>,
    pub objectives: Vec<(f64, f64)>,
}

impl SummaryVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        Self {
            info: MetricInfo::new(name, help),
            labels: label_names(labels),
            objectives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_objectives(mut self, objectives: Vec<(f64, f64)>) -> Self {
        self.objectives = objectives;
        self
    }
}

basic_opts!(
    CounterOpts,
    CounterVecOpts,
    GaugeOpts,
    GaugeVecOpts,
    HistogramOpts,
    HistogramVecOpts,
    SummaryOpts,
    SummaryVecOpts,
);

/// Implements [`MetricOpts`] for a composite, forwarding mask changes and
/// name qualification to each listed component
macro_rules! composite_opts {
    ($opts:ty { $($part:ident),+ }) => {
        impl MetricOpts for $opts {
            fn info(&self) -> &MetricInfo {
                &self.info
            }

            fn info_mut(&mut self) -> &mut MetricInfo {
                &mut self.info
            }

            fn set_mask(&mut self, mask: Mask) {
                self.info.mask = mask;
                $(self.$part.set_mask(mask);)+
            }

            fn qualify(&mut self, group: &str) {
                self.info.name = qualify_name(group, &self.info.name);
                $(self.$part.qualify(group);)+
            }
        }
    };
}

/// Default latency buckets, in seconds
pub const DEFAULT_LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

#[derive(Debug, Clone, PartialEq)]
pub struct TimerOpts {
    pub info: MetricInfo,
    pub histogram: HistogramOpts,
}

impl TimerOpts {
    /// Records into `<name>_duration_seconds`
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        let info = MetricInfo::new(name, help);
        let histogram = HistogramOpts::new(
            format!("{}_duration_seconds", info.name),
            format!("{} (duration in seconds)", info.help),
        )
        .with_buckets(DEFAULT_LATENCY_BUCKETS.to_vec());
        Self { info, histogram }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimerVecOpts {
    pub info: MetricInfo,
    pub histogram: HistogramVecOpts,
}

impl TimerVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        let info = MetricInfo::new(name, help);
        let histogram = HistogramVecOpts::new(
            format!("{}_duration_seconds", info.name),
            format!("{} (duration in seconds)", info.help),
            labels,
        )
        .with_buckets(DEFAULT_LATENCY_BUCKETS.to_vec());
        Self { info, histogram }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheOpts {
    pub info: MetricInfo,
    pub hits: CounterOpts,
    pub misses: CounterOpts,
    pub size: GaugeOpts,
}

impl CacheOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        let info = MetricInfo::new(name, help);
        Self {
            hits: CounterOpts::new(format!("{}_hits_total", info.name), "Cache hits"),
            misses: CounterOpts::new(format!("{}_misses_total", info.name), "Cache misses"),
            size: GaugeOpts::new(format!("{}_size_bytes", info.name), "Cache size in bytes"),
            info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheVecOpts {
    pub info: MetricInfo,
    pub hits: CounterVecOpts,
    pub misses: CounterVecOpts,
    pub size: GaugeVecOpts,
}

impl CacheVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        let info = MetricInfo::new(name, help);
        Self {
            hits: CounterVecOpts::new(format!("{}_hits_total", info.name), "Cache hits", labels),
            misses: CounterVecOpts::new(
                format!("{}_misses_total", info.name),
                "Cache misses",
                labels,
            ),
            size: GaugeVecOpts::new(
                format!("{}_size_bytes", info.name),
                "Cache size in bytes",
                labels,
            ),
            info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolOpts {
    pub info: MetricInfo,
    pub active: GaugeOpts,
    pub idle: GaugeOpts,
    pub acquired: CounterOpts,
    pub released: CounterOpts,
}

impl PoolOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        let info = MetricInfo::new(name, help);
        Self {
            active: GaugeOpts::new(format!("{}_active", info.name), "Active resources"),
            idle: GaugeOpts::new(format!("{}_idle", info.name), "Idle resources"),
            acquired: CounterOpts::new(
                format!("{}_acquired_total", info.name),
                "Resources acquired",
            ),
            released: CounterOpts::new(
                format!("{}_released_total", info.name),
                "Resources released",
            ),
            info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolVecOpts {
    pub info: MetricInfo,
    pub active: GaugeVecOpts,
    pub idle: GaugeVecOpts,
    pub acquired: CounterVecOpts,
    pub released: CounterVecOpts,
}

impl PoolVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        let info = MetricInfo::new(name, help);
        Self {
            active: GaugeVecOpts::new(format!("{}_active", info.name), "Active resources", labels),
            idle: GaugeVecOpts::new(format!("{}_idle", info.name), "Idle resources", labels),
            acquired: CounterVecOpts::new(
                format!("{}_acquired_total", info.name),
                "Resources acquired",
                labels,
            ),
            released: CounterVecOpts::new(
                format!("{}_released_total", info.name),
                "Resources released",
                labels,
            ),
            info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerOpts {
    pub info: MetricInfo,
    pub state: GaugeOpts,
    pub successes: CounterOpts,
    pub failures: CounterOpts,
}

impl CircuitBreakerOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        let info = MetricInfo::new(name, help);
        Self {
            state: GaugeOpts::new(
                format!("{}_state", info.name),
                "Circuit state (0=closed, 1=open, 2=half-open)",
            ),
            successes: CounterOpts::new(
                format!("{}_successes_total", info.name),
                "Successful calls",
            ),
            failures: CounterOpts::new(format!("{}_failures_total", info.name), "Failed calls"),
            info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircuitBreakerVecOpts {
    pub info: MetricInfo,
    pub state: GaugeVecOpts,
    pub successes: CounterVecOpts,
    pub failures: CounterVecOpts,
}

impl CircuitBreakerVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        let info = MetricInfo::new(name, help);
        Self {
            state: GaugeVecOpts::new(
                format!("{}_state", info.name),
                "Circuit state (0=closed, 1=open, 2=half-open)",
                labels,
            ),
            successes: CounterVecOpts::new(
                format!("{}_successes_total", info.name),
                "Successful calls",
                labels,
            ),
            failures: CounterVecOpts::new(
                format!("{}_failures_total", info.name),
                "Failed calls",
                labels,
            ),
            info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueOpts {
    pub info: MetricInfo,
    pub depth: GaugeOpts,
    pub enqueued: CounterOpts,
    pub dequeued: CounterOpts,
    pub wait_time: HistogramOpts,
}

impl QueueOpts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        let info = MetricInfo::new(name, help);
        Self {
            depth: GaugeOpts::new(format!("{}_depth", info.name), "Items waiting"),
            enqueued: CounterOpts::new(format!("{}_enqueued_total", info.name), "Items enqueued"),
            dequeued: CounterOpts::new(format!("{}_dequeued_total", info.name), "Items dequeued"),
            wait_time: HistogramOpts::new(
                format!("{}_wait_time_seconds", info.name),
                "Time items spent waiting",
            )
            .with_buckets(DEFAULT_LATENCY_BUCKETS.to_vec()),
            info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueVecOpts {
    pub info: MetricInfo,
    pub depth: GaugeVecOpts,
    pub enqueued: CounterVecOpts,
    pub dequeued: CounterVecOpts,
    pub wait_time: HistogramVecOpts,
}

impl QueueVecOpts {
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        help: impl Into<String>,
        labels: &[S],
    ) -> Self {
        let info = MetricInfo::new(name, help);
        Self {
            depth: GaugeVecOpts::new(format!("{}_depth", info.name), "Items waiting", labels),
            enqueued: CounterVecOpts::new(
                format!("{}_enqueued_total", info.name),
                "Items enqueued",
                labels,
            ),
            dequeued: CounterVecOpts::new(
                format!("{}_dequeued_total", info.name),
                "Items dequeued",
                labels,
            ),
            wait_time: HistogramVecOpts::new(
                format!("{}_wait_time_seconds", info.name),
                "Time items spent waiting",
                labels,
            )
            .with_buckets(DEFAULT_LATENCY_BUCKETS.to_vec()),
            info,
        }
    }
}

composite_opts!(TimerOpts { histogram });
composite_opts!(TimerVecOpts { histogram });
composite_opts!(CacheOpts { hits, misses, size });
composite_opts!(CacheVecOpts { hits, misses, size });
composite_opts!(PoolOpts { active, idle, acquired, released });
composite_opts!(PoolVecOpts { active, idle, acquired, released });
composite_opts!(CircuitBreakerOpts { state, successes, failures });
composite_opts!(CircuitBreakerVecOpts { state, successes, failures });
composite_opts!(QueueOpts { depth, enqueued, dequeued, wait_time });
composite_opts!(QueueVecOpts { depth, enqueued, dequeued, wait_time });
