//! Utility modules for the metrics facade
//!
//! ## Module Organization
//!
//! - **error**: Error type and result alias
//! - **logging**: Tracing subscriber setup
//! - **stats**: Bounded sample windows used for summary quantiles

pub mod error;
pub mod logging;
pub mod stats;

pub use error::{MetricsError, Result};
pub use logging::{init_json_tracing, init_tracing};
pub use stats::SampleWindow;

/// Join a group name and a metric name into the name handed to backends
pub fn qualify_name(group: &str, name: &str) -> String {
    if group.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", group, name)
    }
}
