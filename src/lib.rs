//! # umami
//!
//! A metrics facade whose handles can be turned on and off at runtime.
//!
//! Every metric is declared with a [`Level`] (how important it is) and a
//! [`Mask`] (which categories it belongs to). A [`Group`] only builds real
//! backend metrics for declarations its own policy admits; everything else
//! gets a no-op. Each recording call is additionally gated by the caller's
//! [`Context`], so a disabled metric costs one comparison and never touches
//! the backend.
//!
//! Handles are [`Switchable`]: raising a group's level with
//! [`LevelOpts::replace_noops`] swaps the no-op behind an existing handle for
//! a real metric, and every clone of that handle sees the change.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use umami::{Counter, CounterOpts, Level, LevelOpts, MemoryBackend, Registry};
//!
//! let registry = Registry::new(Level::Critical);
//! let backend = MemoryBackend::new();
//! let http = registry.new_group("http", Arc::new(backend.clone()), &[]);
//!
//! let requests = http.counter(CounterOpts::new("requests_total", "Requests served"), Level::Debug);
//! requests.inc(&http.context()).unwrap();
//! assert_eq!(backend.counter_value("http_requests_total"), 0.0);
//!
//! registry.set_global_level(Level::Debug, LevelOpts::replace_noops());
//! requests.inc(&http.context()).unwrap();
//! assert_eq!(backend.counter_value("http_requests_total"), 1.0);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod backend;
pub mod config;
pub mod group;
pub mod metrics;
pub mod policy;
pub mod registry;
pub mod utils;

pub use backend::{Backend, Labels, MemoryBackend, NullBackend, labels};
#[cfg(feature = "prometheus")]
pub use backend::PrometheusBackend;
pub use config::{BackendConfig, GroupConfig, MetricsConfig};
pub use group::Group;
pub use metrics::*;
pub use policy::{Context, Level, LevelOpts, Mask};
pub use registry::Registry;
pub use utils::error::{MetricsError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
