//! Integration tests for umami
//!
//! These tests drive the public API end to end and check what actually
//! reached the backend.

pub mod composite_tests;
pub mod concurrency_tests;
pub mod config_tests;
pub mod enablement_tests;
#[cfg(feature = "prometheus")]
pub mod prometheus_tests;
pub mod upgrade_tests;
