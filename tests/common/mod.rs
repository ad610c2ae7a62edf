//! Common test utilities for umami
//!
//! All fixtures record into a real [`MemoryBackend`]; nothing is mocked.

pub mod assertions;
pub mod fixtures;

pub use fixtures::TestMetrics;
