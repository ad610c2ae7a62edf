//! Process-wide coordination of metric groups

mod registry;


pub use registry::Registry;
