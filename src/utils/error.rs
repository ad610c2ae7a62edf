//! Error handling for the metrics facade
//!
//! Disabled metrics never produce errors. Everything in here is either reported
//! by a backend while recording, raised while constructing a backend metric, or
//! raised while loading configuration.

use thiserror::Error;

/// Result type alias for the metrics facade
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Main error type for the metrics facade
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failure reported by a backend adapter while recording
    #[error("Backend error: {0}")]
    Backend(String),

    /// The backend refused to construct a metric
    #[error("Failed to register metric `{name}`: {reason}")]
    Registration { name: String, reason: String },

    /// A value the backend cannot accept (e.g. a negative counter increment)
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A summary was asked for a quantile it does not track
    #[error("Quantile {0} is not tracked by this summary")]
    QuantileUnavailable(f64),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Prometheus client errors
    #[cfg(feature = "prometheus")]
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

impl MetricsError {
    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a registration error for the named metric
    pub fn registration(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Registration {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error was raised while constructing a backend metric
    pub fn is_registration(&self) -> bool {
        matches!(self, Self::Registration { .. })
    }
}
